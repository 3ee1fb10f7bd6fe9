use anyhow::{Context, Result};
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::input::InputSteps;
use crate::lighting::Illumination;
use crate::model::{FillStyle, Geometry, Material, Model};
use crate::registry::ClassificationRule;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_SPHERE_RESOLUTION: u32 = 16;

/// Everything about the scene that is not geometry data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: u32,
    pub height: u32,
    pub clear_color: [f32; 4],
    pub illumination: Illumination,
    pub steps: InputSteps,
    /// Latitude/longitude bands of the sphere mesh
    pub sphere_resolution: u32,
    /// Models shown before any data is loaded
    pub models: Vec<ModelSpec>,
    /// Optional recoloring/filtering of data points, off by default
    pub classification: Option<ClassificationRule>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            clear_color: [0.95, 0.95, 0.95, 1.0],
            illumination: Illumination::default(),
            steps: InputSteps::default(),
            sphere_resolution: DEFAULT_SPHERE_RESOLUTION,
            models: Vec::new(),
            classification: None,
        }
    }
}

impl SceneConfig {
    /// Read a JSON config; absent fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        log::info!("Loaded config {:?}", path);
        Ok(config)
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Material coefficients to override on top of the Phong defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSpec {
    pub ka: Option<[f32; 3]>,
    pub kd: Option<[f32; 3]>,
    pub ks: Option<[f32; 3]>,
    pub ke: Option<f32>,
}

impl MaterialSpec {
    pub fn build(&self) -> Material {
        let mut material = Material::phong();
        if let Some(ka) = self.ka {
            material = material.with_ka(Vec3::from_array(ka));
        }
        if let Some(kd) = self.kd {
            material = material.with_kd(Vec3::from_array(kd));
        }
        if let Some(ks) = self.ks {
            material = material.with_ks(Vec3::from_array(ks));
        }
        if let Some(ke) = self.ke {
            material = material.with_ke(ke);
        }
        material
    }
}

/// A configured startup model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    pub geometry: Geometry,
    pub fill_style: FillStyle,
    pub color: [f32; 4],
    pub translate: [f32; 3],
    /// Radians per axis
    pub rotate: [f32; 3],
    pub scale: [f32; 3],
    pub material: MaterialSpec,
    pub texture: Option<PathBuf>,
    /// Receives rotate and squeeze input instead of the camera
    pub interactive: bool,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            geometry: Geometry::Sphere,
            fill_style: FillStyle::Fill,
            color: [1.0, 1.0, 1.0, 1.0],
            translate: [0.0; 3],
            rotate: [0.0; 3],
            scale: [1.0; 3],
            material: MaterialSpec::default(),
            texture: None,
            interactive: false,
        }
    }
}

impl ModelSpec {
    /// The model without its texture; textures are requested by the scene
    pub fn build(&self) -> Model {
        Model::new(self.geometry, self.fill_style)
            .with_color(Vec4::from_array(self.color))
            .with_translate(Vec3::from_array(self.translate))
            .with_rotate(Vec3::from_array(self.rotate))
            .with_scale(Vec3::from_array(self.scale))
            .with_material(self.material.build())
    }
}
