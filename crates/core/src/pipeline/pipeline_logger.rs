use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting observer for per-frame pipeline events.
///
/// Keeps stage timings and counters out of the orchestration code so a
/// host can collect them (or not) without the pipeline knowing how.
pub trait PipelineLogger: Send {
    /// A cycle completed with `faces` reported faces.
    fn frame(&mut self, index: usize, faces: usize);

    /// A cycle was abandoned.
    fn skipped(&mut self, index: usize, reason: &str);

    /// How long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time metric (raw detection count, captures per frame).
    fn metric(&mut self, name: &str, value: f64);

    /// End-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. Used by embedding hosts and tests.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn frame(&mut self, _index: usize, _faces: usize) {}
    fn skipped(&mut self, _index: usize, _reason: &str) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
}

/// Aggregates stage timings and metrics and logs a summary at session end.
///
/// A progress line is logged every `throttle_frames` processed frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames: usize,
    skipped: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
            skipped: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn skipped_frames(&self) -> usize {
        self.skipped
    }

    /// Formatted summary, or `None` before the first cycle.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.skipped == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Session summary ({} frames, {} skipped, {:.1}s):",
            self.frames,
            self.skipped,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.2}ms  max {max_ms:6.2}ms  total {total_ms:7.0}ms"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        if self.frames > 0 && elapsed_ms > 0.0 {
            let fps = self.frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn frame(&mut self, index: usize, faces: usize) {
        self.frames += 1;
        if self.frames % self.throttle_frames == 0 {
            log::info!("Processed {} frames (frame {index}: {faces} faces)", self.frames);
        }
    }

    fn skipped(&mut self, index: usize, reason: &str) {
        self.skipped += 1;
        log::warn!("Frame {index} skipped: {reason}");
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.frame(0, 1);
        logger.skipped(1, "readback");
        logger.timing("classify", 5.0);
        logger.metric("raw_detections", 3.0);
        logger.summary();
    }

    #[test]
    fn test_timing_records_per_stage() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("classify", 20.0);
        logger.timing("classify", 30.0);
        logger.timing("grayscale", 1.5);

        assert_eq!(logger.timings_for("classify"), Some(&[20.0, 30.0][..]));
        assert_eq!(logger.timings_for("grayscale"), Some(&[1.5][..]));
        assert!(logger.timings_for("overlay").is_none());
    }

    #[test]
    fn test_counts_frames_and_skips() {
        let mut logger = StdoutPipelineLogger::new(2);
        logger.frame(0, 1);
        logger.frame(1, 0);
        logger.skipped(2, "readback refused");
        logger.frame(3, 2);

        assert_eq!(logger.frames(), 3);
        assert_eq!(logger.skipped_frames(), 1);
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.frame(0, 1);
        logger.timing("classify", 10.0);
        logger.timing("cluster", 0.2);
        logger.metric("raw_detections", 3.0);
        logger.metric("raw_detections", 4.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Session summary (1 frames, 0 skipped"));
        assert!(summary.contains("classify"));
        assert!(summary.contains("cluster"));
        assert!(summary.contains("raw_detections: avg 3.5"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_summary_with_only_skips() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.skipped(0, "empty surface");
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("0 frames, 1 skipped"));
        assert!(!summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::default().summary_string().is_none());
    }

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[10.0, 20.0, 30.0]), 20.0);
        assert_relative_eq!(mean(&[]), 0.0);
    }
}
