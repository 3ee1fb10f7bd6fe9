use glam::Mat4;

use crate::math::normal_matrix;
use crate::model::{Model, ModelTransforms};

/// Model matrix: translate, then rotate about X, Y and Z, then scale
///
/// Built by post-multiplying onto the identity, so the translation ends up
/// leftmost and the scale rightmost.
pub fn model_matrix(model: &Model) -> Mat4 {
    Mat4::from_translation(model.translate)
        * Mat4::from_rotation_x(model.rotate.x)
        * Mat4::from_rotation_y(model.rotate.y)
        * Mat4::from_rotation_z(model.rotate.z)
        * Mat4::from_scale(model.scale)
}

/// All matrices for one model under the given view
pub fn compute_transforms(model: &Model, view: &Mat4) -> ModelTransforms {
    let model_matrix = model_matrix(model);
    let model_view = *view * model_matrix;

    ModelTransforms {
        model: model_matrix,
        model_view,
        normal: normal_matrix(&model_view),
    }
}

/// Recompute and store a model's matrices for this frame
pub fn update_transforms(model: &mut Model, view: &Mat4) -> ModelTransforms {
    model.transforms = compute_transforms(model, view);
    model.transforms
}
