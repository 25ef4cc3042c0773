/// Single-channel intensity image handed to the classifier.
///
/// Row-major with a row stride (`ldim`) equal to the width. Produced once
/// per cycle from the surface readback and dropped when the cycle ends.
#[derive(Clone, Debug, PartialEq)]
pub struct LumaFrame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl LumaFrame {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize),
            "pixel count must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
            index,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in pixels.
    pub fn ldim(&self) -> usize {
        self.width as usize
    }

    /// Index of the camera frame this image was derived from.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Intensity at `(row, col)`, or `None` outside the image.
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.height as usize || col >= self.width as usize {
            return None;
        }
        self.pixels.get(row * self.ldim() + col).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_uses_row_major_layout() {
        let img = LumaFrame::new(vec![1, 2, 3, 4, 5, 6], 3, 2, 0);
        assert_eq!(img.ldim(), 3);
        assert_eq!(img.get(0, 2), Some(3));
        assert_eq!(img.get(1, 0), Some(4));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let img = LumaFrame::new(vec![0; 4], 2, 2, 0);
        assert_eq!(img.get(2, 0), None);
        assert_eq!(img.get(0, 2), None);
    }
}
