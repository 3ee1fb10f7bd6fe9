use anyhow::{Context, Result};
use std::path::Path;

/// Decoded texture pixels
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Single-colored image, used as the placeholder binding for untextured draws
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            rgba: rgba.repeat(pixel_count(width, height)),
        }
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Decode an image file into RGBA8
pub fn load_texture(path: impl AsRef<Path>) -> Result<TextureImage> {
    let path = path.as_ref();
    let image = image::open(path)
        .with_context(|| format!("Failed to load texture: {:?}", path))?
        .to_rgba8();

    let (width, height) = image.dimensions();
    log::debug!("Decoded texture {:?}: {}x{}", path, width, height);

    Ok(TextureImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}
