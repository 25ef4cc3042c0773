use ndarray::ArrayView3;

/// Number of interleaved channels in a surface readback (RGBA).
pub const RGBA_CHANNELS: u8 = 4;

/// A color frame: interleaved 8-bit channels in row-major order.
///
/// Camera frames and surface readbacks are RGBA; image files decoded
/// without alpha may arrive as RGB. Consumers index by `channels()`
/// rather than assuming a layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Builds an RGBA frame.
    pub fn rgba(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        Self::new(data, width, height, RGBA_CHANNELS, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Same pixels, different frame index.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 16]; // 2x2x4
        let frame = Frame::rgba(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 4);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_with_index_keeps_pixels() {
        let frame = Frame::rgba(vec![7u8; 4], 1, 1, 0).with_index(9);
        assert_eq!(frame.index(), 9);
        assert_eq!(frame.data(), &[7, 7, 7, 7]);
    }

    #[test]
    fn test_zero_sized_frame_is_empty() {
        assert!(Frame::rgba(Vec::new(), 0, 10, 0).is_empty());
        assert!(!Frame::rgba(vec![0; 4], 1, 1, 0).is_empty());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::rgba(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGBA: pixel (row=1, col=0) is green
        let mut data = vec![0u8; 16];
        data[9] = 255;
        let frame = Frame::rgba(data, 2, 2, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 4]);
        assert_eq!(arr[[1, 0, 0]], 0);
        assert_eq!(arr[[1, 0, 1]], 255);
    }
}
