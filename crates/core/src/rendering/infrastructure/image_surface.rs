use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{imageops, DynamicImage, Pixel, Rgba, RgbImage, RgbaImage};

use crate::rendering::domain::draw_surface::{Color, DrawSurface, Placement, SurfaceError};
use crate::shared::crop_region::CropRegion;
use crate::shared::frame::Frame;

/// Glyph advance used when no font is loaded, as a fraction of the pixel size.
const FALLBACK_ADVANCE: f64 = 0.55;

/// Loads a TrueType/OpenType font for label text.
pub fn load_font(path: &Path) -> Result<FontVec, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    Ok(FontVec::try_from_vec(bytes)?)
}

/// An in-memory RGBA canvas.
///
/// Without a font, text calls are measured with a fixed advance and
/// otherwise skipped; shapes and readback work the same either way.
pub struct ImageSurface {
    canvas: RgbaImage,
    font: Option<FontVec>,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
            font: None,
        }
    }

    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.canvas.width() as i64 || y >= self.canvas.height() as i64 {
            return;
        }
        self.canvas
            .get_pixel_mut(x as u32, y as u32)
            .blend(&Rgba(color.to_array()));
    }
}

fn frame_to_rgba(frame: &Frame) -> Result<RgbaImage, SurfaceError> {
    let data = frame.data().to_vec();
    match frame.channels() {
        4 => RgbaImage::from_raw(frame.width(), frame.height(), data),
        3 => RgbImage::from_raw(frame.width(), frame.height(), data)
            .map(|img| DynamicImage::ImageRgb8(img).to_rgba8()),
        _ => None,
    }
    .ok_or_else(|| {
        SurfaceError::Draw(format!(
            "unsupported frame layout {}x{}x{}",
            frame.width(),
            frame.height(),
            frame.channels()
        ))
    })
}

impl DrawSurface for ImageSurface {
    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas = RgbaImage::new(width, height);
    }

    fn draw_frame(&mut self, frame: &Frame, placement: Placement) -> Result<(), SurfaceError> {
        if frame.is_empty() || placement.width == 0 || placement.height == 0 {
            return Err(SurfaceError::Empty);
        }
        let img = frame_to_rgba(frame)?;
        let img = if img.dimensions() == (placement.width, placement.height) {
            img
        } else {
            imageops::resize(&img, placement.width, placement.height, imageops::FilterType::Triangle)
        };

        self.canvas.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
        imageops::replace(&mut self.canvas, &img, placement.x as i64, placement.y as i64);
        Ok(())
    }

    fn read_pixels(&self, region: CropRegion) -> Result<Frame, SurfaceError> {
        let (width, height) = self.canvas.dimensions();
        if width == 0 || height == 0 || region.width == 0 || region.height == 0 {
            return Err(SurfaceError::Empty);
        }
        if !region.fits_within(width, height) {
            return Err(SurfaceError::OutOfBounds { region, width, height });
        }

        let crop = imageops::crop_imm(&self.canvas, region.x, region.y, region.width, region.height)
            .to_image();
        Ok(Frame::rgba(crop.into_raw(), region.width, region.height, 0))
    }

    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, color: Color) {
        let half = line_width / 2.0;
        let inner = (radius - half).round().max(0.0) as i32;
        let outer = (radius + half).round().max(0.0) as i32;
        let center = (cx.round() as i32, cy.round() as i32);
        for r in inner..=outer {
            imageproc::drawing::draw_hollow_circle_mut(&mut self.canvas, center, r, Rgba(color.to_array()));
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let x0 = x.round() as i64;
        let y0 = y.round() as i64;
        let x1 = (x + width).round() as i64;
        let y1 = (y + height).round() as i64;
        for py in y0.max(0)..y1.min(self.canvas.height() as i64) {
            for px in x0.max(0)..x1.min(self.canvas.width() as i64) {
                self.blend_pixel(px, py, color);
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font_px: f64, color: Color) {
        let Some(font) = &self.font else {
            return;
        };
        let scale = PxScale::from(font_px as f32);
        let ascent = font.as_scaled(scale).ascent() as f64;
        let top = (y - ascent).round() as i32;
        imageproc::drawing::draw_text_mut(
            &mut self.canvas,
            Rgba(color.to_array()),
            x.round() as i32,
            top,
            scale,
            font,
            text,
        );
    }

    fn measure_text(&self, text: &str, font_px: f64) -> f64 {
        match &self.font {
            Some(font) => {
                let (w, _) = imageproc::drawing::text_size(PxScale::from(font_px as f32), font, text);
                w as f64
            }
            None => text.chars().count() as f64 * font_px * FALLBACK_ADVANCE,
        }
    }

    fn release(&mut self) {
        self.canvas = RgbaImage::new(0, 0);
    }
}
