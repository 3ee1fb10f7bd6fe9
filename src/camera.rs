use glam::{Mat4, Vec3};

use crate::math::{frustum_rh_gl, Transform};

pub const DEFAULT_FOVY: f32 = 60.0 * std::f32::consts::PI / 180.0;
pub const DEFAULT_LRTB: f32 = 2.0;
pub const ORTHOGRAPHIC_LRTB: f32 = 2.0;
pub const FRUSTUM_LRTB: f32 = 1.2;

const NEAR_PLANE: f32 = 1.0;
const FRUSTUM_FAR_PLANE: f32 = 10.0;

/// Projection models the camera can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Orthographic,
    Frustum,
    Perspective,
}

/// Camera with an accumulated view matrix
///
/// The view matrix only changes by left-multiplying elementary transforms in
/// call order. `reframe` is the single exception and resets it.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub center: Vec3,
    /// Vertical opening angle in radians
    pub fovy: f32,
    /// Near-plane half extent; far plane in perspective mode
    pub lrtb: f32,
    pub view: Mat4,
    /// Last projection uploaded by the scene controller
    pub projection: Mat4,
    pub aspect: f32,
    /// Accumulated orbit angle around the world Y axis
    pub z_angle: f32,
    mode: ProjectionMode,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::ZERO,
            center: Vec3::ZERO,
            fovy: DEFAULT_FOVY,
            lrtb: DEFAULT_LRTB,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            aspect,
            z_angle: 0.0,
            mode: ProjectionMode::default(),
        }
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// Compose an elementary transform: `view' = transform * view`
    pub fn apply(&mut self, transform: Transform) {
        self.view = transform.matrix() * self.view;
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.apply(Transform::Translate(delta));
    }

    pub fn rotate_x(&mut self, angle: f32) {
        self.apply(Transform::RotateX(angle));
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.apply(Transform::RotateY(angle));
    }

    pub fn rotate_z(&mut self, angle: f32) {
        self.apply(Transform::RotateZ(angle));
    }

    /// Projection for the current mode, OpenGL clip conventions
    pub fn compute_projection(&self) -> Mat4 {
        let v = self.lrtb;
        match self.mode {
            ProjectionMode::Orthographic => Mat4::orthographic_rh_gl(-v, v, -v, v, -v, v),
            ProjectionMode::Frustum => {
                let h = v / 2.0;
                frustum_rh_gl(-h, h, -h, h, NEAR_PLANE, FRUSTUM_FAR_PLANE)
            }
            ProjectionMode::Perspective => {
                Mat4::perspective_rh_gl(self.fovy, self.aspect, NEAR_PLANE, self.lrtb)
            }
        }
    }

    /// Switch projection; orthographic and frustum reset `lrtb` to their defaults
    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
        match mode {
            ProjectionMode::Orthographic => self.lrtb = ORTHOGRAPHIC_LRTB,
            ProjectionMode::Frustum => self.lrtb = FRUSTUM_LRTB,
            ProjectionMode::Perspective => {}
        }
    }

    /// Restart the view for a new world extent
    ///
    /// The eye moves to `eye`, the view becomes a single translation by `-eye`
    /// and the orthographic box takes `half_extent` as its half size.
    pub fn reframe(&mut self, eye: Vec3, half_extent: f32) {
        self.mode = ProjectionMode::Orthographic;
        self.lrtb = half_extent;
        self.eye = eye;
        self.center = eye;
        self.z_angle = 0.0;
        self.view = Mat4::IDENTITY;
        self.translate(-eye);
    }

    pub fn change_fovy(&mut self, delta: f32) {
        self.fovy += delta;
    }

    /// Shrink (`sign > 0`) or grow the near plane by ten percent
    pub fn scale_near_plane(&mut self, sign: f32) {
        self.lrtb *= 1.0 - sign * 0.1;
    }

    /// Move the eye along world Y; the scene moves the other way
    pub fn raise_eye(&mut self, delta: f32) {
        self.eye.y += delta;
        self.translate(Vec3::new(0.0, -delta, 0.0));
    }

    /// Rotate the view about the world Y axis through the look-at center
    pub fn orbit(&mut self, angle: f32) {
        self.z_angle += angle;
        let pivot = self.view.transform_point3(self.center);
        self.translate(-pivot);
        self.rotate_y(angle);
        self.translate(pivot);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}
