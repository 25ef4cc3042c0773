use std::path::Path;

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::capture::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Encodes frames with the `image` crate; format follows the file extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_dynamic(frame: &Frame) -> Option<DynamicImage> {
    let data = frame.data().to_vec();
    match frame.channels() {
        4 => RgbaImage::from_raw(frame.width(), frame.height(), data).map(DynamicImage::ImageRgba8),
        3 => RgbImage::from_raw(frame.width(), frame.height(), data).map(DynamicImage::ImageRgb8),
        _ => None,
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = to_dynamic(frame).ok_or_else(|| {
            format!(
                "Unsupported frame layout {}x{}x{}",
                frame.width(),
                frame.height(),
                frame.channels()
            )
        })?;

        img.save(path)?;
        Ok(())
    }
}
