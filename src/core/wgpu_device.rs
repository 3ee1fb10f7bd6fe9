use anyhow::{Context, Result};
use std::fmt;
use glam::{Mat3, Mat4, Vec3, Vec4};
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, RenderPipeline, Surface, SurfaceConfiguration, TextureView};
use winit::window::Window;

use super::gpu_context::GpuContext;
use crate::geometry::Mesh;
use crate::lighting::EyeSpaceLight;
use crate::loaders::TextureImage;
use crate::model::Material;
use crate::traits::{GraphicsDevice, MeshHandle, PrimitiveKind, TextureHandle, VertexAttributes};
use crate::types::{DrawUniform, GlobalsUniform, LightUniform, Vertex, MAX_LIGHTS};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_DRAW_SLOTS: u64 = 256;

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1]
const GL_TO_WGPU_DEPTH: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 1.0),
);

/// The surface was lost or outdated and has been reconfigured; the frame was
/// dropped and should be requested again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceReconfigured;

impl fmt::Display for SurfaceReconfigured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface lost or outdated, reconfigured")
    }
}

impl std::error::Error for SurfaceReconfigured {}

impl SurfaceReconfigured {
    /// Whether a render error only means the frame has to be redrawn
    pub fn is_cause_of(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| cause.is::<SurfaceReconfigured>())
    }
}

struct GpuMesh {
    vertex_buffer: Buffer,
    triangle_buffer: Buffer,
    line_buffer: Buffer,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: BindGroup,
}

/// A draw with the uniform state captured when it was issued
struct DrawCommand {
    mesh: usize,
    primitive: PrimitiveKind,
    count: u32,
    uniform: DrawUniform,
    texture: Option<TextureHandle>,
}

/// Window-backed device
///
/// State calls update the current uniform values. Draws are queued with a
/// copy of that state and replayed in one render pass by `finish_frame`.
pub struct WgpuDevice {
    gpu: GpuContext,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    depth_view: TextureView,
    clear_color: wgpu::Color,
    fill_pipeline: RenderPipeline,
    line_pipeline: RenderPipeline,
    uniform_layout: BindGroupLayout,
    texture_layout: BindGroupLayout,
    sampler: wgpu::Sampler,
    globals_buffer: Buffer,
    draw_buffer: Buffer,
    draw_stride: u64,
    draw_slots: u64,
    uniform_bind_group: BindGroup,
    default_texture: GpuTexture,
    meshes: Vec<GpuMesh>,
    textures: HashMap<TextureHandle, Option<GpuTexture>>,
    next_texture: u64,
    globals: GlobalsUniform,
    current: DrawUniform,
    bound_texture: Option<TextureHandle>,
    commands: Vec<DrawCommand>,
}

impl WgpuDevice {
    pub fn new(window: Arc<Window>, clear_color: [f32; 4]) -> Result<Self> {
        let size = window.inner_size();
        let (gpu, surface) = pollster::block_on(GpuContext::for_window(window))?;
        let device = gpu.device();

        let surface_caps = surface.get_capabilities(gpu.adapter());
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("Surface reports no supported formats")?;

        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(device, &surface_config);

        let depth_view = Self::create_depth_view(device, surface_config.width, surface_config.height);

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let draw_size = std::mem::size_of::<DrawUniform>() as u64;
        let draw_stride = draw_size.div_ceil(alignment) * alignment;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Uniform Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(draw_size),
                    },
                    count: None,
                },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Model Texture Sampler"),
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            address_mode_w: wgpu::AddressMode::MirrorRepeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Uniform Buffer"),
            contents: bytemuck::bytes_of(&GlobalsUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let draw_buffer = Self::create_draw_buffer(device, INITIAL_DRAW_SLOTS * draw_stride);
        let uniform_bind_group =
            Self::create_uniform_bind_group(device, &uniform_layout, &globals_buffer, &draw_buffer, draw_size);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Phong Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../phong.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let fill_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            PrimitiveKind::Triangles,
        );
        let line_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            PrimitiveKind::Lines,
        );

        let white = TextureImage::solid(1, 1, [255, 255, 255, 255]);
        let default_texture = Self::create_gpu_texture(&gpu, &texture_layout, &sampler, &white);

        let [r, g, b, a] = clear_color.map(f64::from);

        Ok(Self {
            gpu,
            surface,
            surface_config,
            depth_view,
            clear_color: wgpu::Color { r, g, b, a },
            fill_pipeline,
            line_pipeline,
            uniform_layout,
            texture_layout,
            sampler,
            globals_buffer,
            draw_buffer,
            draw_stride,
            draw_slots: INITIAL_DRAW_SLOTS,
            uniform_bind_group,
            default_texture,
            meshes: Vec::new(),
            textures: HashMap::new(),
            next_texture: 0,
            globals: GlobalsUniform::default(),
            current: DrawUniform::default(),
            bound_texture: None,
            commands: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(self.gpu.device(), &self.surface_config);
        self.depth_view = Self::create_depth_view(self.gpu.device(), width, height);
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_draw_buffer(device: &wgpu::Device, size: u64) -> Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_uniform_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayout,
        globals: &Buffer,
        draws: &Buffer,
        draw_size: u64,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Uniform Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: draws,
                        offset: 0,
                        size: NonZeroU64::new(draw_size),
                    }),
                },
            ],
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        primitive: PrimitiveKind,
    ) -> RenderPipeline {
        let (label, topology, cull_mode, bias) = match primitive {
            // Offset fills back so wireframe lines on the same surface win the depth test
            PrimitiveKind::Triangles => (
                "Fill Pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                Some(wgpu::Face::Back),
                wgpu::DepthBiasState {
                    constant: 1,
                    slope_scale: 1.0,
                    clamp: 0.0,
                },
            ),
            PrimitiveKind::Lines => (
                "Line Pipeline",
                wgpu::PrimitiveTopology::LineList,
                None,
                wgpu::DepthBiasState::default(),
            ),
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias,
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_gpu_texture(
        gpu: &GpuContext,
        layout: &BindGroupLayout,
        sampler: &wgpu::Sampler,
        image: &TextureImage,
    ) -> GpuTexture {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Model Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue().write_texture(
            texture.as_image_copy(),
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        GpuTexture {
            _texture: texture,
            bind_group,
        }
    }

    /// Grow the draw uniform buffer to hold every queued draw
    fn reserve_draw_slots(&mut self, needed: u64) {
        if needed <= self.draw_slots {
            return;
        }

        let slots = needed.next_power_of_two();
        let device = self.gpu.device();
        self.draw_buffer = Self::create_draw_buffer(device, slots * self.draw_stride);
        self.uniform_bind_group = Self::create_uniform_bind_group(
            device,
            &self.uniform_layout,
            &self.globals_buffer,
            &self.draw_buffer,
            std::mem::size_of::<DrawUniform>() as u64,
        );
        self.draw_slots = slots;
        log::debug!("Draw uniform buffer grown to {} slots", slots);
    }

    fn write_uniforms(&mut self) {
        self.reserve_draw_slots(self.commands.len() as u64);

        let stride = self.draw_stride as usize;
        let mut bytes = vec![0u8; self.commands.len() * stride];
        for (slot, command) in bytes.chunks_exact_mut(stride).zip(&self.commands) {
            let uniform = bytemuck::bytes_of(&command.uniform);
            slot[..uniform.len()].copy_from_slice(uniform);
        }

        let queue = self.gpu.queue();
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));
        if !bytes.is_empty() {
            queue.write_buffer(&self.draw_buffer, 0, &bytes);
        }
    }
}

impl GraphicsDevice for WgpuDevice {
    fn create_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        let vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .zip(&mesh.tex_coords)
            .map(|((position, normal), tex_coord)| Vertex {
                position: *position,
                normal: *normal,
                tex_coord: *tex_coord,
            })
            .collect();

        let device = self.gpu.device();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let triangle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Triangle Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.triangles),
            usage: wgpu::BufferUsages::INDEX,
        });
        let line_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Line Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.lines),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.meshes.push(GpuMesh {
            vertex_buffer,
            triangle_buffer,
            line_buffer,
        });

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
        if image.width == 0 || image.height == 0 {
            log::warn!("Ignoring empty image for texture {:?}", texture);
            return;
        }
        let Some(slot) = self.textures.get_mut(&texture) else {
            log::warn!("Upload to unknown texture {:?}", texture);
            return;
        };

        *slot = Some(Self::create_gpu_texture(
            &self.gpu,
            &self.texture_layout,
            &self.sampler,
            image,
        ));
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.globals.light_count = 0;
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.globals.projection = (GL_TO_WGPU_DEPTH * projection).to_cols_array_2d();
    }

    fn set_ambient_light(&mut self, color: Vec3) {
        self.globals.ambient = color.to_array();
    }

    fn set_light(&mut self, index: usize, light: &EyeSpaceLight) {
        if index >= MAX_LIGHTS {
            log::warn!("Light {} exceeds the {} supported lights", index, MAX_LIGHTS);
            return;
        }
        self.globals.lights[index] = LightUniform::from(light);
        self.globals.light_count = self.globals.light_count.max(index as u32 + 1);
    }

    fn set_model_view(&mut self, model_view: Mat4) {
        self.current.model_view = model_view.to_cols_array_2d();
    }

    fn set_normal_matrix(&mut self, normal: Mat3) {
        self.current.set_normal(normal);
    }

    fn set_color(&mut self, color: Vec4) {
        self.current.color = color.to_array();
    }

    fn set_material(&mut self, material: &Material) {
        self.current.set_material(material);
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.bound_texture = texture;
    }

    fn set_vertex_attributes(&mut self, attributes: VertexAttributes) {
        self.current.use_lighting = attributes.normals as u32;
        self.current.use_texture = attributes.tex_coords as u32;
    }

    fn draw_elements(&mut self, mesh: &MeshHandle, primitive: PrimitiveKind) {
        let count = match primitive {
            PrimitiveKind::Triangles => mesh.triangle_indices,
            PrimitiveKind::Lines => mesh.line_indices,
        };

        self.commands.push(DrawCommand {
            mesh: mesh.id,
            primitive,
            count,
            uniform: self.current,
            texture: self.bound_texture,
        });
    }

    fn finish_frame(&mut self) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.commands.clear();
                self.surface.configure(self.gpu.device(), &self.surface_config);
                return Err(SurfaceReconfigured.into());
            }
            Err(e) => {
                self.commands.clear();
                return Err(e).context("Failed to acquire surface texture");
            }
        };

        self.write_uniforms();

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, command) in self.commands.iter().enumerate() {
                let Some(mesh) = self.meshes.get(command.mesh) else {
                    continue;
                };
                let texture = command
                    .texture
                    .and_then(|handle| self.textures.get(&handle))
                    .and_then(Option::as_ref)
                    .unwrap_or(&self.default_texture);
                let (pipeline, indices) = match command.primitive {
                    PrimitiveKind::Triangles => (&self.fill_pipeline, &mesh.triangle_buffer),
                    PrimitiveKind::Lines => (&self.line_pipeline, &mesh.line_buffer),
                };

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[(slot as u64 * self.draw_stride) as u32]);
                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..command.count, 0, 0..1);
            }
        }

        self.gpu.queue().submit(Some(encoder.finish()));
        frame.present();
        self.commands.clear();
        Ok(())
    }
}
