pub mod gpu_context;
pub mod input_adapter;
pub mod loader;
pub mod recording;
pub mod wgpu_device;

pub use gpu_context::GpuContext;
pub use input_adapter::{KeyAction, WinitKeyboard};
pub use loader::AssetLoader;
pub use recording::{DeviceCall, RecordedDraw, RecordingDevice};
pub use wgpu_device::{SurfaceReconfigured, WgpuDevice};
