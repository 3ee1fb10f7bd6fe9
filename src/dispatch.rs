use glam::Vec4;

use crate::model::Model;
use crate::traits::{GraphicsDevice, MeshHandle, PrimitiveKind, VertexAttributes};

/// Color forced onto wireframe passes
pub const WIREFRAME_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// What the dispatcher did with one model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn { draw_calls: usize },
    /// Texture requested but not (successfully) loaded
    Skipped,
}

/// Upload a model's draw state and submit its element draws
///
/// Expects `model.transforms` to be current for this frame. Uniform uploads
/// always precede the draws that read them.
pub fn draw_model<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    model: &Model,
    mesh: &MeshHandle,
) -> DrawOutcome {
    if !model.is_drawable() {
        return DrawOutcome::Skipped;
    }

    let textured = model.texture.is_some();

    device.set_model_view(model.transforms.model_view);
    device.set_normal_matrix(model.transforms.normal);
    device.set_color(model.color);
    device.set_material(&model.material);
    device.bind_texture(model.texture.as_ref().map(|slot| slot.handle));

    let mut draw_calls = 0;

    if model.fill_style.has_fill() {
        device.set_vertex_attributes(VertexAttributes {
            normals: true,
            tex_coords: textured,
        });
        device.draw_elements(mesh, PrimitiveKind::Triangles);
        draw_calls += 1;
    }

    if model.fill_style.has_wireframe() {
        device.set_color(WIREFRAME_COLOR);
        device.set_vertex_attributes(VertexAttributes::default());
        device.draw_elements(mesh, PrimitiveKind::Lines);
        draw_calls += 1;
    }

    DrawOutcome::Drawn { draw_calls }
}
