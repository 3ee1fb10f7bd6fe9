pub mod device;
pub mod events;

pub use device::*;
pub use events::*;
