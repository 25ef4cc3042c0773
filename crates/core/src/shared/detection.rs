use serde::{Deserialize, Serialize};

/// A circular detection: center `(row, col)`, diameter `size`, and the
/// classifier confidence accumulated over its constituent windows.
///
/// Serialized as a `[row, col, size, score]` tuple, the layout the
/// classifier emits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Detection {
    pub row: f64,
    pub col: f64,
    pub size: f64,
    pub score: f64,
}

impl Detection {
    pub fn new(row: f64, col: f64, size: f64, score: f64) -> Self {
        Self {
            row,
            col,
            size,
            score,
        }
    }

    /// Intersection-over-union of the axis-aligned squares enclosing
    /// both detections.
    pub fn iou(&self, other: &Detection) -> f64 {
        let overlap_rows = axis_overlap(self.row, self.size, other.row, other.size);
        let overlap_cols = axis_overlap(self.col, self.size, other.col, other.size);
        let inter = overlap_rows * overlap_cols;
        if inter == 0.0 {
            return 0.0;
        }
        let union = self.size * self.size + other.size * other.size - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }
}

fn axis_overlap(center_a: f64, size_a: f64, center_b: f64, size_b: f64) -> f64 {
    let lo = (center_a - size_a / 2.0).max(center_b - size_b / 2.0);
    let hi = (center_a + size_a / 2.0).min(center_b + size_b / 2.0);
    (hi - lo).max(0.0)
}

impl From<[f64; 4]> for Detection {
    fn from([row, col, size, score]: [f64; 4]) -> Self {
        Self::new(row, col, size, score)
    }
}

impl From<Detection> for [f64; 4] {
    fn from(d: Detection) -> Self {
        [d.row, d.col, d.size, d.score]
    }
}
