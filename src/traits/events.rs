use crate::loaders::{PointCloud, TextureImage};
use crate::model::ModelId;

use super::device::TextureHandle;

/// Completion messages from background loaders
#[derive(Debug)]
pub enum SceneEvent {
    TextureLoaded {
        model: ModelId,
        texture: TextureHandle,
        result: Result<TextureImage, String>,
    },
    DataLoaded(Result<PointCloud, String>),
}

/// Destination for loader completions, owned by the render thread's side
pub trait EventSink: Send + 'static {
    fn send(&self, event: SceneEvent);

    /// Handle for another loader thread
    fn clone_box(&self) -> Box<dyn EventSink>;
}

impl EventSink for std::sync::mpsc::Sender<SceneEvent> {
    fn send(&self, event: SceneEvent) {
        // A dropped receiver means the scene is gone; nothing left to notify
        let _ = std::sync::mpsc::Sender::send(self, event);
    }

    fn clone_box(&self) -> Box<dyn EventSink> {
        Box::new(self.clone())
    }
}
