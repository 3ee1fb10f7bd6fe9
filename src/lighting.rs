use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Point light in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    #[serde(default = "default_on")]
    pub is_on: bool,
    pub position: [f32; 3],
    #[serde(default = "default_light_color")]
    pub color: [f32; 3],
}

fn default_on() -> bool {
    true
}

fn default_light_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Light as uploaded for one frame, position already in eye space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeSpaceLight {
    pub is_on: bool,
    pub position: Vec3,
    pub color: Vec3,
}

/// Ambient term plus an ordered list of point lights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Illumination {
    pub ambient: [f32; 3],
    pub lights: Vec<PointLight>,
}

impl Default for Illumination {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2],
            lights: vec![PointLight {
                is_on: true,
                position: [-3.0, 1.0, -3.0],
                color: [1.0, 1.0, 1.0],
            }],
        }
    }
}

impl Illumination {
    pub fn ambient(&self) -> Vec3 {
        Vec3::from_array(self.ambient)
    }

    /// Lights with positions moved into eye space by `view`
    ///
    /// Evaluated fresh each frame; nothing is cached between calls.
    pub fn eye_space_lights<'a>(&'a self, view: &'a Mat4) -> impl Iterator<Item = EyeSpaceLight> + 'a {
        self.lights.iter().map(move |light| EyeSpaceLight {
            is_on: light.is_on,
            position: view.transform_point3(Vec3::from_array(light.position)),
            color: Vec3::from_array(light.color),
        })
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(light) = self.lights.get_mut(index) {
            light.is_on = !light.is_on;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_illumination() {
        let illumination = Illumination::default();
        assert_eq!(illumination.ambient(), Vec3::splat(0.2));
        assert_eq!(illumination.lights.len(), 1);
        assert!(illumination.lights[0].is_on);
    }

    #[test]
    fn test_eye_space_follows_view() {
        let illumination = Illumination::default();
        let view = Mat4::from_translation(Vec3::new(3.0, -1.0, 3.0));
        let lights: Vec<_> = illumination.eye_space_lights(&view).collect();
        assert!(lights[0].position.length() < 1e-6);

        let moved = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let lights: Vec<_> = illumination.eye_space_lights(&moved).collect();
        assert!((lights[0].position - Vec3::new(-3.0, 1.0, -8.0)).length() < 1e-6);
    }

    #[test]
    fn test_toggle_light() {
        let mut illumination = Illumination::default();
        illumination.toggle(0);
        assert!(!illumination.lights[0].is_on);
        illumination.toggle(7);
        assert_eq!(illumination.lights.len(), 1);
    }

    #[test]
    fn test_light_json_defaults() {
        let light: PointLight = serde_json::from_str(r#"{"position": [1.0, 2.0, 3.0]}"#).unwrap();
        assert!(light.is_on);
        assert_eq!(light.color, [1.0, 1.0, 1.0]);
    }
}
