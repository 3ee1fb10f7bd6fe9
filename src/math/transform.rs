use glam::{Mat3, Mat4, Vec3, Vec4};

/// Elementary transforms that compose into a view matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Translate(Vec3),
    RotateX(f32),
    RotateY(f32),
    RotateZ(f32),
}

impl Transform {
    /// Fresh matrix for this transform applied to the identity
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Transform::Translate(delta) => Mat4::from_translation(delta),
            Transform::RotateX(angle) => Mat4::from_rotation_x(angle),
            Transform::RotateY(angle) => Mat4::from_rotation_y(angle),
            Transform::RotateZ(angle) => Mat4::from_rotation_z(angle),
        }
    }
}

/// Off-center perspective frustum with OpenGL clip depth ([-1, 1])
///
/// glam only ships the symmetric variants, this mirrors `glFrustum`.
pub fn frustum_rh_gl(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rl = 1.0 / (right - left);
    let tb = 1.0 / (top - bottom);
    let nf = 1.0 / (near - far);

    Mat4::from_cols(
        Vec4::new(2.0 * near * rl, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * tb, 0.0, 0.0),
        Vec4::new((right + left) * rl, (top + bottom) * tb, (far + near) * nf, -1.0),
        Vec4::new(0.0, 0.0, 2.0 * far * near * nf, 0.0),
    )
}

/// Inverse-transpose of the upper 3x3 block
///
/// A singular block has no normal matrix; identity is returned so lighting
/// degrades instead of producing NaNs.
pub fn normal_matrix(model_view: &Mat4) -> Mat3 {
    let upper = Mat3::from_mat4(*model_view);
    let det = upper.determinant();
    if det == 0.0 || !det.is_finite() {
        return Mat3::IDENTITY;
    }
    upper.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_translate_matrix() {
        let m = Transform::Translate(Vec3::new(1.0, 2.0, 3.0)).matrix();
        assert!(approx_eq(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_rotate_x_quarter_turn() {
        let m = Transform::RotateX(FRAC_PI_2).matrix();
        assert!(approx_eq(m.transform_vector3(Vec3::Y), Vec3::Z));
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        let m = Transform::RotateY(FRAC_PI_2).matrix();
        assert!(approx_eq(m.transform_vector3(Vec3::Z), Vec3::X));
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let m = Transform::RotateZ(FRAC_PI_2).matrix();
        assert!(approx_eq(m.transform_vector3(Vec3::X), Vec3::Y));
    }

    #[test]
    fn test_symmetric_frustum_matches_perspective() {
        // A symmetric frustum with half-extent near*tan(fovy/2) is a perspective projection
        let fovy = 1.0_f32;
        let half = (fovy / 2.0).tan();
        let frustum = frustum_rh_gl(-half, half, -half, half, 1.0, 10.0);
        let perspective = Mat4::perspective_rh_gl(fovy, 1.0, 1.0, 10.0);
        assert!(frustum.abs_diff_eq(perspective, 1e-5));
    }

    #[test]
    fn test_frustum_near_far_planes() {
        let m = frustum_rh_gl(-0.5, 0.5, -0.5, 0.5, 1.0, 10.0);

        let near = m * Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-5);

        let far = m * Vec4::new(0.0, 0.0, -10.0, 1.0);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normal_matrix_rotation_is_rotation() {
        let mv = Mat4::from_rotation_y(0.7);
        let n = normal_matrix(&mv);
        assert!(n.abs_diff_eq(Mat3::from_rotation_y(0.7), 1e-5));
    }

    #[test]
    fn test_normal_matrix_non_uniform_scale() {
        let mv = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&mv);
        // Normals shrink along the stretched axis
        assert!(approx_eq(n * Vec3::X, Vec3::new(0.5, 0.0, 0.0)));
        assert!(approx_eq(n * Vec3::Y, Vec3::Y));
    }

    #[test]
    fn test_normal_matrix_ignores_translation() {
        let mv = Mat4::from_translation(Vec3::new(5.0, -3.0, 2.0));
        assert!(normal_matrix(&mv).abs_diff_eq(Mat3::IDENTITY, 1e-6));
    }

    #[test]
    fn test_normal_matrix_singular_falls_back_to_identity() {
        let mv = Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(normal_matrix(&mv), Mat3::IDENTITY);
    }
}
