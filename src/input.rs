use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::ProjectionMode;

/// Keys the scene reacts to, independent of the windowing backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    X,
    Y,
    Z,
    O,
    F,
    P,
    C,
    H,
    V,
    B,
    L,
    Digit1,
}

/// A key press; shift flips the sign of every step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }

    pub fn sign(&self) -> f32 {
        if self.shift {
            -1.0
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Step sizes applied per key press
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSteps {
    /// Radians per rotate or orbit press
    pub delta_rotate: f32,
    /// Fraction of `lrtb` per camera move, also the eye raise distance
    pub delta_translate: f32,
    /// Relative squeeze per press
    pub delta_scale: f32,
    /// Radians per field-of-view press
    pub delta_fovy: f32,
}

impl Default for InputSteps {
    fn default() -> Self {
        Self {
            delta_rotate: std::f32::consts::PI / 36.0,
            delta_translate: 0.05,
            delta_scale: 0.05,
            delta_fovy: 5.0 * std::f32::consts::PI / 180.0,
        }
    }
}

/// Semantic commands the scene controller executes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Move the camera; the offset is scaled by the camera's `lrtb`
    MoveCamera(Vec3),
    /// Rotate the interactive model, or the camera when there is none
    Rotate { axis: Axis, angle: f32 },
    /// Squeeze the interactive model; ignored without one
    SqueezeTarget { sign: f32, delta: f32 },
    SetProjection(ProjectionMode),
    Orbit(f32),
    RaiseEye(f32),
    ChangeFovy(f32),
    ScaleNearPlane(f32),
    ToggleLight(usize),
    LoadData,
}

/// Translate a key press into commands, in the order they must run
pub fn decode(press: KeyPress, steps: &InputSteps) -> Vec<Command> {
    let sign = press.sign();
    let t = sign * steps.delta_translate;
    let r = sign * steps.delta_rotate;

    match press.key {
        Key::W => vec![Command::MoveCamera(Vec3::new(0.0, -t, 0.0))],
        Key::A => vec![Command::MoveCamera(Vec3::new(t, 0.0, 0.0))],
        Key::S => vec![
            Command::MoveCamera(Vec3::new(0.0, t, 0.0)),
            Command::SqueezeTarget {
                sign,
                delta: steps.delta_scale,
            },
        ],
        Key::D => vec![Command::MoveCamera(Vec3::new(-t, 0.0, 0.0))],
        Key::Space => vec![Command::MoveCamera(Vec3::new(0.0, 0.0, t))],
        Key::X => vec![Command::Rotate { axis: Axis::X, angle: r }],
        Key::Y => vec![Command::Rotate { axis: Axis::Y, angle: r }],
        Key::Z => vec![Command::Rotate { axis: Axis::Z, angle: r }],
        Key::O => vec![Command::SetProjection(ProjectionMode::Orthographic)],
        Key::F => vec![Command::SetProjection(ProjectionMode::Frustum)],
        Key::P => vec![Command::SetProjection(ProjectionMode::Perspective)],
        Key::C => vec![Command::Orbit(r)],
        Key::H => vec![Command::RaiseEye(t)],
        Key::V => vec![Command::ChangeFovy(sign * steps.delta_fovy)],
        Key::B => vec![Command::ScaleNearPlane(sign)],
        Key::L => vec![Command::LoadData],
        Key::Digit1 => vec![Command::ToggleLight(0)],
    }
}
