use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;

/// Persists frames (face captures, annotated surfaces) as image files.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Writes `frames` into `dir` as `{prefix}_{n:04}.png`, returning the paths.
    fn write_numbered(
        &self,
        dir: &Path,
        prefix: &str,
        frames: &[Frame],
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        frames
            .iter()
            .enumerate()
            .map(|(n, frame)| {
                let path = dir.join(format!("{prefix}_{n:04}.png"));
                self.write(&path, frame)?;
                Ok(path)
            })
            .collect()
    }
}
