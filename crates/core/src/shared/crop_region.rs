use crate::shared::detection::Detection;

/// Pixel rectangle inside a surface, always within `[0, w) x [0, h)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Square box of side `size` centered on the detection, clamped to
    /// the surface. `None` when nothing of it remains inside.
    pub fn around(detection: &Detection, surface_w: u32, surface_h: u32) -> Option<Self> {
        let half = detection.size / 2.0;
        let x1 = (detection.col - half).round().max(0.0);
        let y1 = (detection.row - half).round().max(0.0);
        let x2 = (detection.col + half).round().min(surface_w as f64);
        let y2 = (detection.row + half).round().min(surface_h as f64);

        if !(x2 > x1 && y2 > y1) {
            return None;
        }

        Some(Self {
            x: x1 as u32,
            y: y1 as u32,
            width: (x2 - x1) as u32,
            height: (y2 - y1) as u32,
        })
    }

    /// True when the region lies fully inside a `w x h` surface.
    pub fn fits_within(&self, surface_w: u32, surface_h: u32) -> bool {
        self.x as u64 + self.width as u64 <= surface_w as u64
            && self.y as u64 + self.height as u64 <= surface_h as u64
    }
}
