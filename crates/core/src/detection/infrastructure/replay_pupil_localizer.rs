use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::detection::domain::classifier::PupilLocalizer;
use crate::shared::luma_frame::LumaFrame;

const NOT_FOUND: (f64, f64) = (-1.0, -1.0);

/// Replays recorded pupil positions by frame index.
///
/// Each query returns the recorded pupil closest to the eye window center
/// among those lying inside the window, or `(-1, -1)` when the window holds
/// none. Perturbation count is ignored.
pub struct ReplayPupilLocalizer {
    recorded: HashMap<usize, Vec<[f64; 2]>>,
}

impl ReplayPupilLocalizer {
    pub fn new(recorded: HashMap<usize, Vec<[f64; 2]>>) -> Self {
        Self { recorded }
    }

    /// Loads a JSON object mapping frame index to `[row, col]` pairs,
    /// e.g. `{"0": [[94, 86], [94, 114]]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let recorded: HashMap<usize, Vec<[f64; 2]>> = serde_json::from_str(text)?;
        log::debug!("Loaded recorded pupils for {} frames", recorded.len());
        Ok(Self::new(recorded))
    }

    pub fn frame_count(&self) -> usize {
        self.recorded.len()
    }
}

impl PupilLocalizer for ReplayPupilLocalizer {
    fn localize(
        &self,
        row: f64,
        col: f64,
        size: f64,
        _perturbs: usize,
        image: &LumaFrame,
    ) -> (f64, f64) {
        let Some(pupils) = self.recorded.get(&image.index()) else {
            return NOT_FOUND;
        };
        let half = size / 2.0;
        pupils
            .iter()
            .filter(|[r, c]| (r - row).abs() <= half && (c - col).abs() <= half)
            .min_by(|a, b| {
                let da = (a[0] - row).powi(2) + (a[1] - col).powi(2);
                let db = (b[0] - row).powi(2) + (b[1] - col).powi(2);
                da.total_cmp(&db)
            })
            .map(|[r, c]| (*r, *c))
            .unwrap_or(NOT_FOUND)
    }
}
