use glam::{Mat3, Mat4, Vec3, Vec4};
use std::collections::{HashMap, HashSet};

use crate::geometry::Mesh;
use crate::lighting::EyeSpaceLight;
use crate::loaders::TextureImage;
use crate::model::Material;
use crate::traits::{GraphicsDevice, MeshHandle, PrimitiveKind, TextureHandle, VertexAttributes};

/// One call made against a `RecordingDevice`
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Clear,
    SetProjection(Mat4),
    SetAmbientLight(Vec3),
    SetLight { index: usize, light: EyeSpaceLight },
    SetModelView(Mat4),
    SetNormalMatrix(Mat3),
    SetColor(Vec4),
    SetMaterial(Material),
    BindTexture(Option<TextureHandle>),
    SetVertexAttributes(VertexAttributes),
    DrawElements { mesh: usize, primitive: PrimitiveKind, count: u32 },
    FinishFrame,
}

/// Draw call together with the state it was issued under
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub mesh: usize,
    pub primitive: PrimitiveKind,
    pub count: u32,
    pub projection: Mat4,
    pub model_view: Mat4,
    pub normal: Mat3,
    pub color: Vec4,
    pub material: Material,
    pub texture: Option<TextureHandle>,
    pub attributes: VertexAttributes,
}

#[derive(Debug, Clone)]
struct DrawState {
    projection: Mat4,
    model_view: Mat4,
    normal: Mat3,
    color: Vec4,
    material: Material,
    texture: Option<TextureHandle>,
    attributes: VertexAttributes,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
            normal: Mat3::IDENTITY,
            color: Vec4::ONE,
            material: Material::phong(),
            texture: None,
            attributes: VertexAttributes::default(),
        }
    }
}

/// Headless device that records calls instead of rasterizing
///
/// `calls` and `draws` cover the current frame, which starts at `clear`.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    draws: Vec<RecordedDraw>,
    state: DrawState,
    meshes: Vec<usize>,
    textures: HashMap<TextureHandle, Option<(u32, u32)>>,
    released: HashSet<TextureHandle>,
    next_texture: u64,
    frames: usize,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    pub fn draws_of(&self, primitive: PrimitiveKind) -> usize {
        self.draws.iter().filter(|d| d.primitive == primitive).count()
    }

    /// Frames completed through `finish_frame`
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Dimensions of an uploaded texture, `None` if never uploaded or released
    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied().flatten()
    }

    pub fn is_released(&self, texture: TextureHandle) -> bool {
        self.released.contains(&texture)
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        self.meshes.push(mesh.vertex_count());
        MeshHandle {
            id: self.meshes.len() - 1,
            triangle_indices: mesh.triangles.len() as u32,
            line_indices: mesh.lines.len() as u32,
        }
    }

    fn create_texture(&mut self) -> TextureHandle {
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(handle, None);
        handle
    }

    fn upload_texture(&mut self, texture: TextureHandle, image: &TextureImage) {
        if let Some(size) = self.textures.get_mut(&texture) {
            *size = Some((image.width, image.height));
        }
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        self.released.insert(texture);
    }

    fn clear(&mut self) {
        self.calls.clear();
        self.draws.clear();
        self.calls.push(DeviceCall::Clear);
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.state.projection = projection;
        self.calls.push(DeviceCall::SetProjection(projection));
    }

    fn set_ambient_light(&mut self, color: Vec3) {
        self.calls.push(DeviceCall::SetAmbientLight(color));
    }

    fn set_light(&mut self, index: usize, light: &EyeSpaceLight) {
        self.calls.push(DeviceCall::SetLight { index, light: *light });
    }

    fn set_model_view(&mut self, model_view: Mat4) {
        self.state.model_view = model_view;
        self.calls.push(DeviceCall::SetModelView(model_view));
    }

    fn set_normal_matrix(&mut self, normal: Mat3) {
        self.state.normal = normal;
        self.calls.push(DeviceCall::SetNormalMatrix(normal));
    }

    fn set_color(&mut self, color: Vec4) {
        self.state.color = color;
        self.calls.push(DeviceCall::SetColor(color));
    }

    fn set_material(&mut self, material: &Material) {
        self.state.material = *material;
        self.calls.push(DeviceCall::SetMaterial(*material));
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.state.texture = texture;
        self.calls.push(DeviceCall::BindTexture(texture));
    }

    fn set_vertex_attributes(&mut self, attributes: VertexAttributes) {
        self.state.attributes = attributes;
        self.calls.push(DeviceCall::SetVertexAttributes(attributes));
    }

    fn draw_elements(&mut self, mesh: &MeshHandle, primitive: PrimitiveKind) {
        let count = match primitive {
            PrimitiveKind::Triangles => mesh.triangle_indices,
            PrimitiveKind::Lines => mesh.line_indices,
        };

        self.calls.push(DeviceCall::DrawElements {
            mesh: mesh.id,
            primitive,
            count,
        });
        self.draws.push(RecordedDraw {
            mesh: mesh.id,
            primitive,
            count,
            projection: self.state.projection,
            model_view: self.state.model_view,
            normal: self.state.normal,
            color: self.state.color,
            material: self.state.material,
            texture: self.state.texture,
            attributes: self.state.attributes,
        });
    }

    fn finish_frame(&mut self) -> anyhow::Result<()> {
        self.calls.push(DeviceCall::FinishFrame);
        self.frames += 1;
        Ok(())
    }
}
