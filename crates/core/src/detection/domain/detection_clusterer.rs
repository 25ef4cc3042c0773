use crate::shared::detection::Detection;

/// Domain interface for collapsing overlapping detections.
///
/// Every input maps to exactly one output cluster, so the result is never
/// longer than the input.
pub trait DetectionClusterer: Send {
    fn cluster(&self, detections: &[Detection], overlap_threshold: f64) -> Vec<Detection>;
}

/// Greedy clustering seeded by the highest-scoring unassigned detection.
///
/// A cluster absorbs every unassigned detection whose overlap with the seed
/// exceeds the threshold. Its representative averages position and size
/// over members and sums their scores.
pub struct GreedyClusterer;

impl GreedyClusterer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GreedyClusterer {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionClusterer for GreedyClusterer {
    fn cluster(&self, detections: &[Detection], overlap_threshold: f64) -> Vec<Detection> {
        let mut sorted = detections.to_vec();
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut assigned = vec![false; sorted.len()];
        let mut clusters = Vec::new();

        for i in 0..sorted.len() {
            if assigned[i] {
                continue;
            }
            let seed = sorted[i];
            let mut sum = Detection::new(0.0, 0.0, 0.0, 0.0);
            let mut members = 0usize;

            for j in i..sorted.len() {
                if assigned[j] || (j != i && seed.iou(&sorted[j]) <= overlap_threshold) {
                    continue;
                }
                assigned[j] = true;
                sum.row += sorted[j].row;
                sum.col += sorted[j].col;
                sum.size += sorted[j].size;
                sum.score += sorted[j].score;
                members += 1;
            }

            let n = members as f64;
            clusters.push(Detection::new(sum.row / n, sum.col / n, sum.size / n, sum.score));
        }

        clusters
    }
}
