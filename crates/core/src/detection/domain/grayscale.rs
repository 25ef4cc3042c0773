use ndarray::Axis;

use crate::shared::frame::Frame;
use crate::shared::luma_frame::LumaFrame;

/// Luma of one pixel: `round((2R + 7G + B) / 10)`.
///
/// The cascade was trained on exactly this weighting; changing it shifts
/// classifier scores.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 2 * r as u32 + 7 * g as u32 + b as u32;
    ((weighted + 5) / 10) as u8
}

/// Converts an interleaved color frame (RGBA or RGB) to a luma image of the
/// same dimensions. Alpha is ignored.
pub fn to_grayscale(frame: &Frame) -> LumaFrame {
    let pixels: Vec<u8> = frame
        .as_ndarray()
        .lanes(Axis(2))
        .into_iter()
        .map(|px| luma(px[0], px[1], px[2]))
        .collect();
    LumaFrame::new(pixels, frame.width(), frame.height(), frame.index())
}
