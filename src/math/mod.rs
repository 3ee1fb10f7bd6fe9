mod aabb;
mod transform;

pub use aabb::AABB;
pub use transform::{frustum_rh_gl, normal_matrix, Transform};
