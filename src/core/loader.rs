use std::path::PathBuf;
use std::thread;

use crate::loaders::{load_points_file, load_texture};
use crate::model::ModelId;
use crate::traits::{EventSink, SceneEvent, TextureHandle};

/// Runs file loads off the render thread and reports back through a sink
pub struct AssetLoader {
    sink: Box<dyn EventSink>,
}

impl AssetLoader {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Decode an image for `model`; completion arrives as `SceneEvent::TextureLoaded`
    pub fn load_texture(&self, model: ModelId, texture: TextureHandle, path: PathBuf) {
        let sink = self.sink.clone_box();
        let name = format!("texture-loader-{}", texture.0);
        let spawned = thread::Builder::new().name(name).spawn(move || {
            let result = load_texture(&path).map_err(|e| format!("{:#}", e));
            sink.send(SceneEvent::TextureLoaded {
                model,
                texture,
                result,
            });
        });

        if let Err(e) = spawned {
            log::error!("Failed to start texture load: {}", e);
            self.sink.send(SceneEvent::TextureLoaded {
                model,
                texture,
                result: Err(e.to_string()),
            });
        }
    }

    /// Parse a points file; completion arrives as `SceneEvent::DataLoaded`
    pub fn load_data(&self, path: PathBuf) {
        let sink = self.sink.clone_box();
        let spawned = thread::Builder::new()
            .name("data-loader".to_string())
            .spawn(move || {
                let result = load_points_file(&path).map_err(|e| format!("{:#}", e));
                sink.send(SceneEvent::DataLoaded(result));
            });

        if let Err(e) = spawned {
            log::error!("Failed to start data load: {}", e);
            self.sink.send(SceneEvent::DataLoaded(Err(e.to_string())));
        }
    }
}
