use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::geometry::Mesh;
use crate::lighting::EyeSpaceLight;
use crate::loaders::TextureImage;
use crate::model::Material;

/// Device-side mesh: vertex data plus triangle and line index sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    pub id: usize,
    pub triangle_indices: u32,
    pub line_indices: u32,
}

/// Opaque texture reference issued by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Element topology for an indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Triangles,
    Lines,
}

/// Optional vertex attributes fed to the next draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexAttributes {
    pub normals: bool,
    pub tex_coords: bool,
}

/// Graphics device seen by the render pipeline
///
/// Draw state is global: uniforms set before `draw_elements` apply to that
/// draw and every later one until overwritten.
pub trait GraphicsDevice {
    /// Upload a mesh and keep its buffers alive
    fn create_mesh(&mut self, mesh: &Mesh) -> MeshHandle;

    /// Reserve a texture whose pixels arrive later
    fn create_texture(&mut self) -> TextureHandle;

    fn upload_texture(&mut self, texture: TextureHandle, image: &TextureImage);

    fn release_texture(&mut self, texture: TextureHandle);

    /// Start a frame by clearing color and depth
    fn clear(&mut self);

    fn set_projection(&mut self, projection: Mat4);

    fn set_ambient_light(&mut self, color: Vec3);

    fn set_light(&mut self, index: usize, light: &EyeSpaceLight);

    fn set_model_view(&mut self, model_view: Mat4);

    fn set_normal_matrix(&mut self, normal: Mat3);

    fn set_color(&mut self, color: Vec4);

    fn set_material(&mut self, material: &Material);

    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    fn set_vertex_attributes(&mut self, attributes: VertexAttributes);

    fn draw_elements(&mut self, mesh: &MeshHandle, primitive: PrimitiveKind);

    /// Flush everything recorded since `clear` to the output
    fn finish_frame(&mut self) -> anyhow::Result<()>;
}
