use crate::detection::domain::classifier::{FaceClassifier, RegionClassifier, SearchParams};
use crate::shared::detection::Detection;
use crate::shared::luma_frame::LumaFrame;

/// Multi-scale sliding-window search over an opaque region scorer.
///
/// Window sides grow geometrically from `min_size` to `max_size`. At each
/// scale the window center steps by `shift_factor * size` (at least one
/// pixel) while keeping the whole window inside the image. Windows with a
/// positive score become raw detections.
pub struct CascadeScanner {
    classifier: Box<dyn RegionClassifier>,
}

impl CascadeScanner {
    pub fn new(classifier: Box<dyn RegionClassifier>) -> Self {
        Self { classifier }
    }

    fn scan_scale(&self, image: &LumaFrame, size: f64, shift_factor: f64, out: &mut Vec<Detection>) {
        let step = (shift_factor * size).max(1.0) as usize;
        let offset = (size / 2.0 + 1.0) as usize;
        let nrows = image.height() as usize;
        let ncols = image.width() as usize;
        if nrows < offset || ncols < offset {
            return;
        }

        for row in (offset..=nrows - offset).step_by(step) {
            for col in (offset..=ncols - offset).step_by(step) {
                let (r, c) = (row as f64, col as f64);
                let score = self.classifier.classify_region(r, c, size, image);
                if score > 0.0 {
                    out.push(Detection::new(r, c, size, score));
                }
            }
        }
    }
}

impl FaceClassifier for CascadeScanner {
    fn detect(
        &mut self,
        image: &LumaFrame,
        params: &SearchParams,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        if params.scale_factor <= 1.0 {
            return Err(format!("scale_factor must be > 1.0, got {}", params.scale_factor).into());
        }
        if !params.min_size.is_finite() || !params.max_size.is_finite() {
            return Err(format!(
                "window sizes must be finite, got {} and {}",
                params.min_size, params.max_size
            )
            .into());
        }
        if params.min_size <= 0.0 {
            return Err(format!("min_size must be positive, got {}", params.min_size).into());
        }

        let mut detections = Vec::new();
        let mut size = params.min_size;
        while size <= params.max_size {
            self.scan_scale(image, size, params.shift_factor, &mut detections);
            size *= params.scale_factor;
        }
        Ok(detections)
    }
}
