pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod geometry;
pub mod input;
pub mod lighting;
pub mod loaders;
pub mod math;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod scene;
pub mod traits;
pub mod types;

pub use camera::{Camera, ProjectionMode};
pub use config::SceneConfig;
pub use scene::{FrameStats, SceneController, SceneState};
