use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::detection::domain::classifier::{FaceClassifier, SearchParams};
use crate::shared::detection::Detection;
use crate::shared::luma_frame::LumaFrame;

/// Replays recorded raw detections by frame index.
///
/// Stands in for the cascade when a session is re-run offline: the
/// detections recorded on device for frame `n` are returned whenever the
/// luma image derived from frame `n` is classified. Unknown frames yield
/// no detections.
pub struct ReplayFaceClassifier {
    recorded: HashMap<usize, Vec<Detection>>,
}

impl ReplayFaceClassifier {
    pub fn new(recorded: HashMap<usize, Vec<Detection>>) -> Self {
        Self { recorded }
    }

    /// Loads a JSON object mapping frame index to `[row, col, size, score]`
    /// tuples, e.g. `{"0": [[100, 100, 80, 60]], "1": []}`.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let recorded: HashMap<usize, Vec<Detection>> = serde_json::from_str(text)?;
        log::debug!("Loaded recorded detections for {} frames", recorded.len());
        Ok(Self::new(recorded))
    }

    pub fn frame_count(&self) -> usize {
        self.recorded.len()
    }
}

impl FaceClassifier for ReplayFaceClassifier {
    fn detect(
        &mut self,
        image: &LumaFrame,
        _params: &SearchParams,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        Ok(self
            .recorded
            .get(&image.index())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(index: usize) -> LumaFrame {
        LumaFrame::new(vec![0; 4], 2, 2, index)
    }

    #[test]
    fn test_returns_recorded_detections_for_frame() {
        let dets = vec![Detection::new(100.0, 100.0, 80.0, 60.0)];
        let mut replay = ReplayFaceClassifier::new(HashMap::from([(3, dets.clone())]));

        let result = replay.detect(&image(3), &SearchParams::default()).unwrap();

        assert_eq!(result, dets);
    }

    #[test]
    fn test_unknown_frame_is_empty() {
        let mut replay = ReplayFaceClassifier::new(HashMap::new());
        assert!(replay
            .detect(&image(9), &SearchParams::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parses_json_tuples() {
        let mut replay =
            ReplayFaceClassifier::from_json_str(r#"{"0": [[50, 50, 40, 80], [52, 51, 42, 75]], "2": []}"#)
                .unwrap();

        assert_eq!(replay.frame_count(), 2);
        let frame0 = replay.detect(&image(0), &SearchParams::default()).unwrap();
        assert_eq!(frame0.len(), 2);
        assert_eq!(frame0[1], Detection::new(52.0, 51.0, 42.0, 75.0));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(ReplayFaceClassifier::from_json_str(r#"{"0": [[1, 2, 3]]}"#).is_err());
        assert!(ReplayFaceClassifier::from_json_str("not json").is_err());
    }

    #[test]
    fn test_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.json");
        fs::write(&path, r#"{"1": [[10, 20, 30, 40]]}"#).unwrap();

        let mut replay = ReplayFaceClassifier::from_json_file(&path).unwrap();

        let dets = replay.detect(&image(1), &SearchParams::default()).unwrap();
        assert_eq!(dets, vec![Detection::new(10.0, 20.0, 30.0, 40.0)]);
    }
}
