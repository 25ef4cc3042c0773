use thiserror::Error;

use crate::shared::crop_region::CropRegion;
use crate::shared::frame::Frame;

/// Straight (non-premultiplied) RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with fractional opacity in `[0, 1]`.
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Destination rectangle of a video frame on the surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("surface has no pixels")]
    Empty,
    #[error("pixel readback refused: {0}")]
    Restricted(String),
    #[error("region {region:?} lies outside the {width}x{height} surface")]
    OutOfBounds {
        region: CropRegion,
        width: u32,
        height: u32,
    },
    #[error("cannot draw frame: {0}")]
    Draw(String),
}

/// The display surface frames are rendered onto and read back from.
///
/// Coordinates are surface pixels with the origin top-left. Text is
/// positioned by its baseline.
pub trait DrawSurface: Send {
    fn size(&self) -> (u32, u32);

    /// Resizes the surface, clearing it.
    fn resize(&mut self, width: u32, height: u32);

    /// Clears the surface and draws a video frame scaled into `placement`.
    fn draw_frame(&mut self, frame: &Frame, placement: Placement) -> Result<(), SurfaceError>;

    /// Reads back a region as an RGBA frame.
    fn read_pixels(&self, region: CropRegion) -> Result<Frame, SurfaceError>;

    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, color: Color);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font_px: f64, color: Color);

    /// Advance width of `text` at `font_px`.
    fn measure_text(&self, text: &str, font_px: f64) -> f64;

    /// Drops retained pixel storage. Called once at teardown.
    fn release(&mut self) {}
}
