use std::collections::VecDeque;

use crate::shared::constants::DEFAULT_MEMORY_WINDOW;
use crate::shared::detection::Detection;

/// Domain interface for temporal stabilization of raw detections.
///
/// `update` is called exactly once per processed frame, in frame order,
/// with that frame's full raw set. Its result replaces the raw set for
/// every downstream consumer.
pub trait DetectionMemory: Send {
    fn update(&mut self, detections: &[Detection]) -> Vec<Detection>;

    /// Drops all accumulated evidence.
    fn reset(&mut self);
}

/// Sliding window over the last `window` frames of raw detections.
///
/// Each update returns every detection still in the window, oldest frame
/// first. Clustering then sums the scores of co-located entries, so a face
/// seen in several consecutive frames accumulates confidence past the
/// reporting threshold while a one-frame flicker does not, and a face that
/// drops out keeps being reported until its evidence ages out.
pub struct WindowedDetectionMemory {
    window: usize,
    frames: VecDeque<Vec<Detection>>,
}

impl WindowedDetectionMemory {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            frames: VecDeque::with_capacity(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of frames currently held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for WindowedDetectionMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_WINDOW)
    }
}

impl DetectionMemory for WindowedDetectionMemory {
    fn update(&mut self, detections: &[Detection]) -> Vec<Detection> {
        if self.frames.len() == self.window {
            self.frames.pop_front();
        }
        self.frames.push_back(detections.to_vec());
        self.frames.iter().flatten().copied().collect()
    }

    fn reset(&mut self) {
        self.frames.clear();
    }
}
