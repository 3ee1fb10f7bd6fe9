use glam::{Mat3, Mat4, Vec4};

use crate::lighting::EyeSpaceLight;
use crate::model::Material;

/// Lights the shader evaluates per fragment
pub const MAX_LIGHTS: usize = 4;

/// Interleaved vertex as stored in the vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Point light as laid out in the globals uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub is_on: u32,
    pub color: [f32; 3],
    pub _pad: f32,
}

impl From<&EyeSpaceLight> for LightUniform {
    fn from(light: &EyeSpaceLight) -> Self {
        Self {
            position: light.position.to_array(),
            is_on: light.is_on as u32,
            color: light.color.to_array(),
            _pad: 0.0,
        }
    }
}

/// Per-frame uniform: projection and lighting
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub projection: [[f32; 4]; 4],
    pub ambient: [f32; 3],
    pub light_count: u32,
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl Default for GlobalsUniform {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            ambient: [0.0; 3],
            light_count: 0,
            lights: [LightUniform::default(); MAX_LIGHTS],
        }
    }
}

/// Per-draw uniform, one slot per draw call at a dynamic offset
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model_view: [[f32; 4]; 4],
    /// mat3x3 columns padded to 16 bytes
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
    pub ka: [f32; 3],
    pub shininess: f32,
    pub kd: [f32; 3],
    pub use_lighting: u32,
    pub ks: [f32; 3],
    pub use_texture: u32,
}

impl Default for DrawUniform {
    fn default() -> Self {
        let mut uniform = Self {
            model_view: Mat4::IDENTITY.to_cols_array_2d(),
            normal: [[0.0; 4]; 3],
            color: Vec4::ONE.to_array(),
            ka: [0.0; 3],
            shininess: 1.0,
            kd: [0.0; 3],
            use_lighting: 0,
            ks: [0.0; 3],
            use_texture: 0,
        };
        uniform.set_normal(Mat3::IDENTITY);
        uniform.set_material(&Material::phong());
        uniform
    }
}

impl DrawUniform {
    pub fn set_normal(&mut self, normal: Mat3) {
        for (column, dst) in self.normal.iter_mut().enumerate() {
            *dst = normal.col(column).extend(0.0).to_array();
        }
    }

    pub fn set_material(&mut self, material: &Material) {
        self.ka = material.ka.to_array();
        self.kd = material.kd.to_array();
        self.ks = material.ks.to_array();
        self.shininess = material.ke;
    }
}
