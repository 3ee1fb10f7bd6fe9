use glam::{Mat3, Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::traits::TextureHandle;

/// Geometry a model is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    #[default]
    Sphere,
}

/// Which element sets get drawn for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillStyle {
    #[default]
    #[serde(rename = "fill")]
    Fill,
    #[serde(rename = "wireframe")]
    Wireframe,
    #[serde(rename = "fillwireframe")]
    FillAndWireframe,
}

impl FillStyle {
    pub fn has_fill(self) -> bool {
        matches!(self, FillStyle::Fill | FillStyle::FillAndWireframe)
    }

    pub fn has_wireframe(self) -> bool {
        matches!(self, FillStyle::Wireframe | FillStyle::FillAndWireframe)
    }
}

/// Phong material coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ka: Vec3,
    pub kd: Vec3,
    pub ks: Vec3,
    /// Specular exponent
    pub ke: f32,
}

impl Material {
    pub fn phong() -> Self {
        Self {
            ka: Vec3::splat(0.3),
            kd: Vec3::splat(0.6),
            ks: Vec3::splat(0.8),
            ke: 10.0,
        }
    }

    pub fn with_ka(self, ka: Vec3) -> Self {
        Self { ka, ..self }
    }

    pub fn with_kd(self, kd: Vec3) -> Self {
        Self { kd, ..self }
    }

    pub fn with_ks(self, ks: Vec3) -> Self {
        Self { ks, ..self }
    }

    pub fn with_ke(self, ke: f32) -> Self {
        Self { ke, ..self }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::phong()
    }
}

/// Load progress of a model's texture
#[derive(Debug, Clone, PartialEq)]
pub enum TextureState {
    Pending,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlot {
    pub handle: TextureHandle,
    pub state: TextureState,
}

impl TextureSlot {
    pub fn pending(handle: TextureHandle) -> Self {
        Self {
            handle,
            state: TextureState::Pending,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state == TextureState::Loaded
    }
}

/// Matrices derived from a model and the camera, rebuilt every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransforms {
    pub model: Mat4,
    pub model_view: Mat4,
    pub normal: Mat3,
}

impl Default for ModelTransforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
            normal: Mat3::IDENTITY,
        }
    }
}

/// Stable reference into a model registry
///
/// The generation makes ids from a replaced model set resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId {
    pub generation: u64,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub geometry: Geometry,
    pub fill_style: FillStyle,
    pub color: Vec4,
    pub translate: Vec3,
    /// Per-axis rotation in radians
    pub rotate: Vec3,
    pub scale: Vec3,
    pub material: Material,
    pub transforms: ModelTransforms,
    pub texture: Option<TextureSlot>,
}

impl Model {
    pub fn new(geometry: Geometry, fill_style: FillStyle) -> Self {
        Self {
            geometry,
            fill_style,
            color: Vec4::ONE,
            translate: Vec3::ZERO,
            rotate: Vec3::ZERO,
            scale: Vec3::ONE,
            material: Material::phong(),
            transforms: ModelTransforms::default(),
            texture: None,
        }
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_translate(mut self, translate: Vec3) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_rotate(mut self, rotate: Vec3) -> Self {
        self.rotate = rotate;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Textured models stay hidden until their texture is loaded
    pub fn is_drawable(&self) -> bool {
        self.texture.as_ref().map_or(true, TextureSlot::is_loaded)
    }

    /// Stretch along X and Z while squeezing Y, or the reverse for `sign < 0`
    pub fn squeeze(&mut self, sign: f32, delta: f32) {
        self.scale.x *= 1.0 + sign * delta;
        self.scale.y *= 1.0 - sign * delta;
        self.scale.z *= 1.0 + sign * delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_style_flags() {
        assert!(FillStyle::Fill.has_fill());
        assert!(!FillStyle::Fill.has_wireframe());
        assert!(!FillStyle::Wireframe.has_fill());
        assert!(FillStyle::Wireframe.has_wireframe());
        assert!(FillStyle::FillAndWireframe.has_fill());
        assert!(FillStyle::FillAndWireframe.has_wireframe());
    }

    #[test]
    fn test_fill_style_serde_names() {
        let style: FillStyle = serde_json::from_str("\"fillwireframe\"").unwrap();
        assert_eq!(style, FillStyle::FillAndWireframe);
        assert_eq!(serde_json::to_string(&FillStyle::Wireframe).unwrap(), "\"wireframe\"");
    }

    #[test]
    fn test_phong_defaults() {
        let m = Material::phong();
        assert_eq!(m.ka, Vec3::splat(0.3));
        assert_eq!(m.kd, Vec3::splat(0.6));
        assert_eq!(m.ks, Vec3::splat(0.8));
        assert_eq!(m.ke, 10.0);
    }

    #[test]
    fn test_material_override_keeps_other_coefficients() {
        let m = Material::phong().with_kd(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(m.kd, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(m.ka, Vec3::splat(0.3));
    }

    #[test]
    fn test_untextured_model_is_drawable() {
        assert!(Model::new(Geometry::Sphere, FillStyle::Fill).is_drawable());
    }

    #[test]
    fn test_texture_gates_drawing() {
        let mut model = Model::new(Geometry::Sphere, FillStyle::Fill);
        model.texture = Some(TextureSlot::pending(TextureHandle(3)));
        assert!(!model.is_drawable());

        if let Some(slot) = model.texture.as_mut() {
            slot.state = TextureState::Failed("missing".to_string());
        }
        assert!(!model.is_drawable());

        if let Some(slot) = model.texture.as_mut() {
            slot.state = TextureState::Loaded;
        }
        assert!(model.is_drawable());
    }

    #[test]
    fn test_squeeze() {
        let mut model = Model::new(Geometry::Sphere, FillStyle::Fill);
        model.squeeze(1.0, 0.05);
        assert!((model.scale - Vec3::new(1.05, 0.95, 1.05)).length() < 1e-6);
    }
}
