use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::loaders::points::position;
use crate::loaders::{DataStats, Point};
use crate::model::{FillStyle, Geometry, Material, Model, ModelId};

/// Divisor turning a dataset's extent into a sphere scale
pub const POINT_SCALE_DIVISOR: f32 = 100.0;

/// Diffuse color for data points
pub const POINT_KD: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Recolor or drop points by the value of one of their fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Field index inside each point record
    pub column: usize,
    pub value: f32,
    /// Diffuse color for matching points
    #[serde(default = "default_class_kd")]
    pub kd: [f32; 3],
    /// Skip matching points instead of recoloring them
    #[serde(default)]
    pub exclude: bool,
}

fn default_class_kd() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

impl ClassificationRule {
    fn matches(&self, point: &[f32]) -> bool {
        point.get(self.column).is_some_and(|v| *v == self.value)
    }
}

/// Knobs for building models from data; the default reproduces plain green spheres
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildOptions {
    pub classification: Option<ClassificationRule>,
}

/// Owner of the active model set
///
/// The set is only ever replaced as a whole. Every replacement starts a new
/// generation so ids handed out earlier stop resolving.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<Model>,
    generation: u64,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop every model, returning them so their resources can be released
    pub fn clear(&mut self) -> Vec<Model> {
        self.generation += 1;
        std::mem::take(&mut self.models)
    }

    /// One green sphere per point, scaled to the dataset's extent
    pub fn rebuild_from(&mut self, points: &[Point], stats: &DataStats) -> Vec<Model> {
        self.rebuild_with(points, stats, &RebuildOptions::default())
    }

    pub fn rebuild_with(
        &mut self,
        points: &[Point],
        stats: &DataStats,
        options: &RebuildOptions,
    ) -> Vec<Model> {
        let removed = self.clear();

        let scale = Vec3::splat(stats.max_range / POINT_SCALE_DIVISOR);
        let base = Material::phong().with_kd(POINT_KD);

        let mut short = 0usize;
        self.models = points
            .iter()
            .filter_map(|p| {
                let Some(translate) = position(p) else {
                    short += 1;
                    return None;
                };
                let material = match &options.classification {
                    Some(rule) if rule.matches(p) => {
                        if rule.exclude {
                            return None;
                        }
                        base.with_kd(Vec3::from_array(rule.kd))
                    }
                    _ => base,
                };

                Some(
                    Model::new(Geometry::Sphere, FillStyle::Fill)
                        .with_translate(translate)
                        .with_scale(scale)
                        .with_material(material),
                )
            })
            .collect();

        if short > 0 {
            log::warn!("Skipped {} records with fewer than 3 fields", short);
        }
        log::debug!(
            "Registry generation {}: {} models from {} points",
            self.generation,
            self.models.len(),
            points.len()
        );
        removed
    }

    /// Replace the set with explicitly built models
    pub fn populate(&mut self, models: Vec<Model>) -> Vec<Model> {
        let removed = self.clear();
        self.models = models;
        removed
    }

    /// Id for the model at `index` in the current generation
    pub fn id_at(&self, index: usize) -> Option<ModelId> {
        (index < self.models.len()).then_some(ModelId {
            generation: self.generation,
            index,
        })
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        if id.generation != self.generation {
            return None;
        }
        self.models.get(id.index)
    }

    pub fn get_mut(&mut self, id: ModelId) -> Option<&mut Model> {
        if id.generation != self.generation {
            return None;
        }
        self.models.get_mut(id.index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Model> {
        self.models.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(max_range: f32) -> DataStats {
        DataStats {
            max_range,
            mean: Vec3::ZERO,
        }
    }

    #[test]
    fn test_rebuild_creates_one_sphere_per_point() {
        let mut registry = ModelRegistry::new();
        let points = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0, 9.0]];
        registry.rebuild_from(&points, &stats(50.0));

        assert_eq!(registry.len(), 2);
        let model = registry.iter().nth(1).unwrap();
        assert_eq!(model.geometry, Geometry::Sphere);
        assert_eq!(model.fill_style, FillStyle::Fill);
        assert_eq!(model.translate, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(model.rotate, Vec3::ZERO);
        assert_eq!(model.scale, Vec3::splat(0.5));
        assert_eq!(model.material.kd, POINT_KD);
    }

    #[test]
    fn test_rebuild_skips_short_records() {
        let mut registry = ModelRegistry::new();
        let points = vec![vec![1.0, 2.0, 3.0], vec![7.0], vec![4.0, 5.0, 6.0]];
        registry.rebuild_from(&points, &stats(1.0));

        assert_eq!(registry.len(), 2);
        let translates: Vec<Vec3> = registry.iter().map(|m| m.translate).collect();
        assert_eq!(translates, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn test_rebuild_replaces_previous_set() {
        let mut registry = ModelRegistry::new();
        registry.rebuild_from(&vec![vec![0.0; 3]; 5], &stats(1.0));
        let removed = registry.rebuild_from(&vec![vec![0.0; 3]; 2], &stats(1.0));

        assert_eq!(removed.len(), 5);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_stale_ids_do_not_resolve() {
        let mut registry = ModelRegistry::new();
        registry.rebuild_from(&[vec![0.0; 3]], &stats(1.0));
        let id = registry.id_at(0).unwrap();
        assert!(registry.get(id).is_some());

        registry.rebuild_from(&[vec![0.0; 3]], &stats(1.0));
        assert!(registry.get(id).is_none());
        assert!(registry.get_mut(id).is_none());
    }

    #[test]
    fn test_id_at_out_of_range() {
        let registry = ModelRegistry::new();
        assert!(registry.id_at(0).is_none());
    }

    #[test]
    fn test_clear_bumps_generation() {
        let mut registry = ModelRegistry::new();
        let generation = registry.generation();
        registry.clear();
        assert_eq!(registry.generation(), generation + 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_classification_recolors_matching_points() {
        let mut registry = ModelRegistry::new();
        let options = RebuildOptions {
            classification: Some(ClassificationRule {
                column: 3,
                value: 2.0,
                kd: [1.0, 0.0, 0.0],
                exclude: false,
            }),
        };
        let points = vec![vec![0.0, 0.0, 0.0, 1.0], vec![0.0, 0.0, 0.0, 2.0]];
        registry.rebuild_with(&points, &stats(1.0), &options);

        let kds: Vec<Vec3> = registry.iter().map(|m| m.material.kd).collect();
        assert_eq!(kds, vec![POINT_KD, Vec3::X]);
    }

    #[test]
    fn test_classification_can_exclude_points() {
        let mut registry = ModelRegistry::new();
        let options = RebuildOptions {
            classification: Some(ClassificationRule {
                column: 3,
                value: 1.0,
                kd: default_class_kd(),
                exclude: true,
            }),
        };
        let points = vec![vec![0.0, 0.0, 0.0, 1.0], vec![0.0, 0.0, 0.0, 2.0], vec![1.0, 1.0, 1.0]];
        registry.rebuild_with(&points, &stats(1.0), &options);
        assert_eq!(registry.len(), 2);
    }
}
