use std::fmt;
use std::time::Instant;

use crate::detection::domain::classifier::{FaceClassifier, PupilLocalizer, SearchParams, WindowSizing};
use crate::detection::domain::detection_clusterer::{DetectionClusterer, GreedyClusterer};
use crate::detection::domain::detection_memory::{DetectionMemory, WindowedDetectionMemory};
use crate::detection::domain::eye_regions::locate_pupils;
use crate::detection::domain::grayscale::to_grayscale;
use crate::pipeline::output_sizing::OutputSizing;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::rendering::domain::draw_surface::{DrawSurface, SurfaceError};
use crate::rendering::domain::overlay_renderer::{OverlayRenderer, OverlayReport, Resolutions};
use crate::shared::constants::{
    DEFAULT_CLUSTER_THRESHOLD, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MEMORY_WINDOW,
    DEFAULT_PUPIL_PERTURBS,
};
use crate::shared::crop_region::CropRegion;
use crate::shared::detection::Detection;
use crate::shared::face_annotation::FaceAnnotation;
use crate::shared::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PupilConfig {
    pub perturbs: usize,
}

impl Default for PupilConfig {
    fn default() -> Self {
        Self {
            perturbs: DEFAULT_PUPIL_PERTURBS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub search: SearchParams,
    pub window_sizing: WindowSizing,
    pub memory_window: usize,
    pub cluster_threshold: f64,
    /// Faces must score strictly above this.
    pub confidence_threshold: f64,
    pub output_sizing: OutputSizing,
    /// Locate pupils when set and a localizer is attached.
    pub pupils: Option<PupilConfig>,
    pub capture_faces: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search: SearchParams::default(),
            window_sizing: WindowSizing::default(),
            memory_window: DEFAULT_MEMORY_WINDOW,
            cluster_threshold: DEFAULT_CLUSTER_THRESHOLD,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            output_sizing: OutputSizing::default(),
            pupils: None,
            capture_faces: true,
        }
    }
}

/// Result of one completed cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedFrame {
    pub index: usize,
    pub faces: Vec<FaceAnnotation>,
    /// RGBA crops of the surface, one per face whose box survived clamping.
    pub captures: Vec<Frame>,
    /// Milliseconds from cycle start to captured crops. Excludes overlay drawing.
    pub process_time_ms: f64,
    pub output_size: (u32, u32),
    pub native_size: (u32, u32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    Draw(SurfaceError),
    Readback(SurfaceError),
    Classifier(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Draw(e) => write!(f, "draw failed: {e}"),
            SkipReason::Readback(e) => write!(f, "readback failed: {e}"),
            SkipReason::Classifier(e) => write!(f, "classifier failed: {e}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    Processed(ProcessedFrame),
    /// The cycle contributed nothing; detection memory is untouched.
    Skipped(SkipReason),
}

impl FrameOutcome {
    pub fn processed(&self) -> Option<&ProcessedFrame> {
        match self {
            FrameOutcome::Processed(frame) => Some(frame),
            FrameOutcome::Skipped(_) => None,
        }
    }
}

/// Per-frame driver: draw, read back, grayscale, classify, stabilize,
/// cluster, filter, crop, annotate.
///
/// Owns the detection memory, so one pipeline serves one camera session.
/// Per-frame failures never escape [`FramePipeline::process`].
pub struct FramePipeline {
    config: PipelineConfig,
    classifier: Box<dyn FaceClassifier>,
    localizer: Option<Box<dyn PupilLocalizer>>,
    memory: Box<dyn DetectionMemory>,
    clusterer: Box<dyn DetectionClusterer>,
    renderer: OverlayRenderer,
    logger: Box<dyn PipelineLogger>,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig, classifier: Box<dyn FaceClassifier>) -> Self {
        let memory = Box::new(WindowedDetectionMemory::new(config.memory_window));
        Self {
            config,
            classifier,
            localizer: None,
            memory,
            clusterer: Box::new(GreedyClusterer::new()),
            renderer: OverlayRenderer::default(),
            logger: Box::new(NullPipelineLogger),
        }
    }

    pub fn with_localizer(mut self, localizer: Box<dyn PupilLocalizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    pub fn with_memory(mut self, memory: Box<dyn DetectionMemory>) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_clusterer(mut self, clusterer: Box<dyn DetectionClusterer>) -> Self {
        self.clusterer = clusterer;
        self
    }

    pub fn with_renderer(mut self, renderer: OverlayRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    /// Forgets all detection history.
    pub fn reset_memory(&mut self) {
        self.memory.reset();
    }

    pub fn process(&mut self, frame: &Frame, surface: &mut dyn DrawSurface) -> FrameOutcome {
        let index = frame.index();
        match self.run_cycle(frame, surface) {
            Ok(processed) => {
                self.logger.frame(index, processed.faces.len());
                FrameOutcome::Processed(processed)
            }
            Err(reason) => {
                self.logger.skipped(index, &reason.to_string());
                FrameOutcome::Skipped(reason)
            }
        }
    }

    fn run_cycle(
        &mut self,
        frame: &Frame,
        surface: &mut dyn DrawSurface,
    ) -> Result<ProcessedFrame, SkipReason> {
        let start = Instant::now();
        let native_size = (frame.width(), frame.height());
        let layout = self.config.output_sizing.layout(native_size);
        if surface.size() != layout.surface {
            surface.resize(layout.surface.0, layout.surface.1);
        }
        let (width, height) = layout.surface;

        let t = Instant::now();
        surface
            .draw_frame(frame, layout.placement)
            .map_err(SkipReason::Draw)?;
        self.logger.timing("draw", elapsed_ms(t));

        let t = Instant::now();
        let pixels = surface
            .read_pixels(CropRegion::full(width, height))
            .map_err(SkipReason::Readback)?;
        self.logger.timing("readback", elapsed_ms(t));

        let t = Instant::now();
        let gray = to_grayscale(&pixels.with_index(frame.index()));
        self.logger.timing("grayscale", elapsed_ms(t));

        let t = Instant::now();
        let params = self
            .config
            .search
            .for_surface(self.config.window_sizing, width, height);
        let raw = self
            .classifier
            .detect(&gray, &params)
            .map_err(|e| SkipReason::Classifier(e.to_string()))?;
        self.logger.timing("classify", elapsed_ms(t));
        self.logger.metric("raw_detections", raw.len() as f64);

        let t = Instant::now();
        let stabilized = self.memory.update(&raw);
        self.logger.timing("memory", elapsed_ms(t));

        let t = Instant::now();
        let clustered = self
            .clusterer
            .cluster(&stabilized, self.config.cluster_threshold);
        self.logger.timing("cluster", elapsed_ms(t));

        let threshold = self.config.confidence_threshold;
        let qualifying: Vec<Detection> = clustered
            .into_iter()
            .filter(|d| d.score > threshold)
            .collect();

        let faces: Vec<FaceAnnotation> = qualifying
            .iter()
            .map(|d| {
                log::debug!(
                    "Face at ({:.0}, {:.0}) size {:.0} confidence {:.1}",
                    d.col,
                    d.row,
                    d.size,
                    d.score
                );
                let mut face = FaceAnnotation::from_detection(d);
                if let (Some(pupils), Some(localizer)) = (self.config.pupils, &self.localizer) {
                    face.pupils = locate_pupils(localizer.as_ref(), d, pupils.perturbs, &gray);
                }
                face
            })
            .collect();

        let t = Instant::now();
        let captures = if self.config.capture_faces {
            extract_captures(surface, &qualifying, frame.index())
        } else {
            Vec::new()
        };
        self.logger.timing("crop", elapsed_ms(t));
        self.logger.metric("captures", captures.len() as f64);

        let process_time_ms = elapsed_ms(start);

        let t = Instant::now();
        let report = OverlayReport {
            process_time_ms,
            resolutions: Resolutions {
                output: layout.surface,
                native: native_size,
            },
        };
        self.renderer.render(surface, &faces, &report);
        self.logger.timing("overlay", elapsed_ms(t));

        Ok(ProcessedFrame {
            index: frame.index(),
            faces,
            captures,
            process_time_ms,
            output_size: layout.surface,
            native_size,
        })
    }
}

/// Crops each detection's box from the clean surface. A failed crop is
/// logged and skipped; the remaining detections still get theirs.
fn extract_captures(surface: &dyn DrawSurface, detections: &[Detection], index: usize) -> Vec<Frame> {
    let (width, height) = surface.size();
    detections
        .iter()
        .filter_map(|d| {
            let region = CropRegion::around(d, width, height)?;
            match surface.read_pixels(region) {
                Ok(crop) => Some(crop.with_index(index)),
                Err(e) => {
                    log::warn!("Face capture at ({:.0}, {:.0}) failed: {e}", d.col, d.row);
                    None
                }
            }
        })
        .collect()
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::domain::draw_surface::{Color, Placement};
    use crate::rendering::infrastructure::image_surface::ImageSurface;
    use crate::shared::luma_frame::LumaFrame;
    use approx::assert_relative_eq;
    use std::collections::VecDeque;

    // --- Stubs ---

    /// Returns the same detections on every call.
    struct FixedClassifier(Vec<Detection>);

    impl FaceClassifier for FixedClassifier {
        fn detect(
            &mut self,
            _image: &LumaFrame,
            _params: &SearchParams,
        ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            Ok(self.0.clone())
        }
    }

    /// Returns one scripted result per call, then nothing.
    struct ScriptedClassifier(VecDeque<Result<Vec<Detection>, String>>);

    impl FaceClassifier for ScriptedClassifier {
        fn detect(
            &mut self,
            _image: &LumaFrame,
            _params: &SearchParams,
        ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            match self.0.pop_front() {
                Some(Ok(dets)) => Ok(dets),
                Some(Err(e)) => Err(e.into()),
                None => Ok(Vec::new()),
            }
        }
    }

    /// Records the search params it was called with.
    struct ParamsProbe(std::sync::Arc<std::sync::Mutex<Vec<SearchParams>>>);

    impl FaceClassifier for ParamsProbe {
        fn detect(
            &mut self,
            _image: &LumaFrame,
            params: &SearchParams,
        ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            self.0.lock().unwrap().push(*params);
            Ok(Vec::new())
        }
    }

    /// Finds the pupil at the center of every eye window.
    struct CenterPupils;

    impl PupilLocalizer for CenterPupils {
        fn localize(&self, row: f64, col: f64, _: f64, _: usize, _: &LumaFrame) -> (f64, f64) {
            (row, col)
        }
    }

    /// Image surface whose readback fails on chosen draw cycles (1-based).
    struct FlakySurface {
        inner: ImageSurface,
        fail_on: Vec<usize>,
        draws: usize,
        crops_fail: bool,
    }

    impl FlakySurface {
        fn failing_readback_on(fail_on: Vec<usize>) -> Self {
            Self {
                inner: ImageSurface::new(0, 0),
                fail_on,
                draws: 0,
                crops_fail: false,
            }
        }

        fn failing_crops() -> Self {
            Self {
                crops_fail: true,
                ..Self::failing_readback_on(Vec::new())
            }
        }
    }

    impl DrawSurface for FlakySurface {
        fn size(&self) -> (u32, u32) {
            self.inner.size()
        }
        fn resize(&mut self, width: u32, height: u32) {
            self.inner.resize(width, height)
        }
        fn draw_frame(&mut self, frame: &Frame, placement: Placement) -> Result<(), SurfaceError> {
            self.draws += 1;
            self.inner.draw_frame(frame, placement)
        }
        fn read_pixels(&self, region: CropRegion) -> Result<Frame, SurfaceError> {
            let full = region == CropRegion::full(self.inner.size().0, self.inner.size().1);
            if full && self.fail_on.contains(&self.draws) {
                return Err(SurfaceError::Restricted("tainted".into()));
            }
            if !full && self.crops_fail {
                return Err(SurfaceError::Restricted("tainted".into()));
            }
            self.inner.read_pixels(region)
        }
        fn stroke_circle(&mut self, cx: f64, cy: f64, r: f64, lw: f64, color: Color) {
            self.inner.stroke_circle(cx, cy, r, lw, color)
        }
        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
            self.inner.fill_rect(x, y, w, h, color)
        }
        fn fill_text(&mut self, text: &str, x: f64, y: f64, px: f64, color: Color) {
            self.inner.fill_text(text, x, y, px, color)
        }
        fn measure_text(&self, text: &str, px: f64) -> f64 {
            self.inner.measure_text(text, px)
        }
    }

    /// Counts how often the pipeline resets memory.
    struct CountingMemory {
        inner: WindowedDetectionMemory,
        resets: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl DetectionMemory for CountingMemory {
        fn update(&mut self, detections: &[Detection]) -> Vec<Detection> {
            self.inner.update(detections)
        }
        fn reset(&mut self) {
            self.resets.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.reset();
        }
    }

    // --- Helpers ---

    fn frame(index: usize) -> Frame {
        Frame::rgba([90, 120, 150, 255].repeat(320 * 240), 320, 240, index)
    }

    fn det(row: f64, col: f64, size: f64, score: f64) -> Detection {
        Detection::new(row, col, size, score)
    }

    fn pipeline(classifier: impl FaceClassifier + 'static) -> FramePipeline {
        FramePipeline::new(PipelineConfig::default(), Box::new(classifier))
    }

    fn run(pipeline: &mut FramePipeline, surface: &mut dyn DrawSurface, frames: usize) -> Vec<FrameOutcome> {
        (0..frames).map(|i| pipeline.process(&frame(i), surface)).collect()
    }

    fn all_captures(outcomes: &[FrameOutcome]) -> Vec<&Frame> {
        outcomes
            .iter()
            .filter_map(FrameOutcome::processed)
            .flat_map(|p| p.captures.iter())
            .collect()
    }

    // --- Scenarios ---

    #[test]
    fn test_steady_face_over_five_frames() {
        let mut pipeline = pipeline(FixedClassifier(vec![det(100.0, 100.0, 80.0, 60.0)]));
        let mut surface = ImageSurface::new(0, 0);
        let outcomes = run(&mut pipeline, &mut surface, 5);

        let last = outcomes[4].processed().unwrap();
        assert_eq!(last.faces.len(), 1);
        let face = &last.faces[0];
        assert_relative_eq!(face.x, 100.0);
        assert_relative_eq!(face.y, 100.0);
        assert_relative_eq!(face.size, 80.0);
        assert_relative_eq!(face.confidence, 300.0);

        let captures = all_captures(&outcomes);
        assert_eq!(captures.len(), 5);
        for (i, crop) in captures.iter().enumerate() {
            assert_eq!((crop.width(), crop.height()), (80, 80));
            assert_eq!(crop.index(), i);
        }
    }

    #[test]
    fn test_no_detections_for_ten_frames() {
        let mut pipeline = pipeline(FixedClassifier(Vec::new()));
        let mut surface = ImageSurface::new(0, 0);
        let outcomes = run(&mut pipeline, &mut surface, 10);

        for outcome in &outcomes {
            let processed = outcome.processed().unwrap();
            assert!(processed.faces.is_empty());
        }
        assert!(all_captures(&outcomes).is_empty());
    }

    #[test]
    fn test_overlapping_pair_merges_into_one_face() {
        let mut pipeline = pipeline(FixedClassifier(vec![
            det(50.0, 50.0, 40.0, 80.0),
            det(52.0, 51.0, 42.0, 75.0),
        ]));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);

        let faces = &outcome.processed().unwrap().faces;
        assert_eq!(faces.len(), 1);
        assert_relative_eq!(faces[0].y, 51.0);
        assert_relative_eq!(faces[0].x, 50.5);
        assert_relative_eq!(faces[0].confidence, 155.0);
    }

    #[test]
    fn test_readback_failure_on_third_frame() {
        let mut pipeline = pipeline(FixedClassifier(vec![det(100.0, 100.0, 80.0, 60.0)]));
        let mut surface = FlakySurface::failing_readback_on(vec![3]);
        let outcomes = run(&mut pipeline, &mut surface, 5);

        assert!(matches!(
            outcomes[2],
            FrameOutcome::Skipped(SkipReason::Readback(SurfaceError::Restricted(_)))
        ));
        let processed: Vec<usize> = outcomes
            .iter()
            .filter_map(FrameOutcome::processed)
            .map(|p| p.index)
            .collect();
        assert_eq!(processed, vec![0, 1, 3, 4]);

        let captured: Vec<usize> = all_captures(&outcomes).iter().map(|c| c.index()).collect();
        assert_eq!(captured, vec![0, 1, 3, 4]);

        // the skipped cycle never reached the memory: four frames of evidence
        let last = outcomes[4].processed().unwrap();
        assert_relative_eq!(last.faces[0].confidence, 240.0);
    }

    // --- Threshold and crops ---

    #[test]
    fn test_score_at_threshold_is_not_reported() {
        let mut pipeline = pipeline(FixedClassifier(vec![det(100.0, 100.0, 80.0, 50.0)]));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);
        let processed = outcome.processed().unwrap();
        assert!(processed.faces.is_empty());
        assert!(processed.captures.is_empty());
    }

    #[test]
    fn test_weak_face_accumulates_across_frames() {
        let mut pipeline = pipeline(FixedClassifier(vec![det(100.0, 100.0, 80.0, 30.0)]));
        let mut surface = ImageSurface::new(0, 0);
        let outcomes = run(&mut pipeline, &mut surface, 2);

        assert!(outcomes[0].processed().unwrap().faces.is_empty());
        assert_eq!(outcomes[1].processed().unwrap().faces.len(), 1);
    }

    #[test]
    fn test_edge_face_crop_is_clamped() {
        let mut pipeline = pipeline(FixedClassifier(vec![det(20.0, 300.0, 80.0, 60.0)]));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);

        let crop = &outcome.processed().unwrap().captures[0];
        assert_eq!((crop.width(), crop.height()), (60, 60));
    }

    #[test]
    fn test_off_surface_face_has_no_capture() {
        let mut pipeline = pipeline(FixedClassifier(vec![det(100.0, -60.0, 80.0, 60.0)]));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);

        let processed = outcome.processed().unwrap();
        assert_eq!(processed.faces.len(), 1);
        assert!(processed.captures.is_empty());
    }

    #[test]
    fn test_failed_crop_keeps_the_frame() {
        let mut pipeline = pipeline(FixedClassifier(vec![
            det(60.0, 60.0, 80.0, 60.0),
            det(150.0, 220.0, 80.0, 60.0),
        ]));
        let mut surface = FlakySurface::failing_crops();
        let outcome = pipeline.process(&frame(0), &mut surface);

        let processed = outcome.processed().unwrap();
        assert_eq!(processed.faces.len(), 2);
        assert!(processed.captures.is_empty());
    }

    #[test]
    fn test_captures_disabled() {
        let config = PipelineConfig {
            capture_faces: false,
            ..PipelineConfig::default()
        };
        let mut pipeline = FramePipeline::new(
            config,
            Box::new(FixedClassifier(vec![det(100.0, 100.0, 80.0, 60.0)])),
        );
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);
        assert!(outcome.processed().unwrap().captures.is_empty());
    }

    #[test]
    fn test_captures_exclude_overlay() {
        let mut pipeline = pipeline(FixedClassifier(vec![det(100.0, 100.0, 80.0, 60.0)]));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);

        let crop = &outcome.processed().unwrap().captures[0];
        assert!(crop.data().chunks(4).all(|px| px == [90, 120, 150, 255]));
        // while the surface itself carries the circle at radius 40
        assert_eq!(surface.canvas().get_pixel(140, 100).0, [255, 0, 0, 255]);
    }

    // --- Failure handling ---

    #[test]
    fn test_classifier_error_skips_without_touching_memory() {
        let mut pipeline = pipeline(ScriptedClassifier(VecDeque::from(vec![
            Ok(vec![det(100.0, 100.0, 80.0, 60.0)]),
            Err("model crashed".to_string()),
            Ok(vec![det(100.0, 100.0, 80.0, 60.0)]),
        ])));
        let mut surface = ImageSurface::new(0, 0);
        let outcomes = run(&mut pipeline, &mut surface, 3);

        assert_eq!(
            outcomes[1],
            FrameOutcome::Skipped(SkipReason::Classifier("model crashed".into()))
        );
        assert_relative_eq!(outcomes[2].processed().unwrap().faces[0].confidence, 120.0);
    }

    #[test]
    fn test_empty_frame_is_skipped() {
        let mut pipeline = pipeline(FixedClassifier(Vec::new()));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&Frame::rgba(Vec::new(), 0, 0, 0), &mut surface);
        assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::Draw(SurfaceError::Empty)));
    }

    // --- Configuration ---

    #[test]
    fn test_reset_memory_clears_history() {
        let resets = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let memory = CountingMemory {
            inner: WindowedDetectionMemory::new(5),
            resets: resets.clone(),
        };
        let mut pipeline = pipeline(FixedClassifier(vec![det(100.0, 100.0, 80.0, 60.0)]))
            .with_memory(Box::new(memory));
        let mut surface = ImageSurface::new(0, 0);

        run(&mut pipeline, &mut surface, 3);
        pipeline.reset_memory();
        let outcome = pipeline.process(&frame(3), &mut surface);

        assert_eq!(resets.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_relative_eq!(outcome.processed().unwrap().faces[0].confidence, 60.0);
    }

    #[test]
    fn test_fit_to_sizing_letterboxes() {
        let config = PipelineConfig {
            output_sizing: OutputSizing::FitTo { width: 160, height: 160 },
            ..PipelineConfig::default()
        };
        let mut pipeline = FramePipeline::new(config, Box::new(FixedClassifier(Vec::new())));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);

        let processed = outcome.processed().unwrap();
        assert_eq!(processed.output_size, (160, 160));
        assert_eq!(processed.native_size, (320, 240));
        assert_eq!(surface.size(), (160, 160));
        assert_eq!(surface.canvas().get_pixel(80, 5).0, [0, 0, 0, 0]);
        assert_eq!(surface.canvas().get_pixel(80, 80).0, [90, 120, 150, 255]);
    }

    #[test]
    fn test_relative_window_sizing_reaches_classifier() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let config = PipelineConfig {
            window_sizing: WindowSizing::RelativeToSurface {
                min_fraction: 0.25,
                max_fraction: 0.5,
            },
            ..PipelineConfig::default()
        };
        let mut pipeline = FramePipeline::new(config, Box::new(ParamsProbe(seen.clone())));
        let mut surface = ImageSurface::new(0, 0);
        pipeline.process(&frame(0), &mut surface);

        let params = seen.lock().unwrap()[0];
        assert_relative_eq!(params.min_size, 60.0);
        assert_relative_eq!(params.max_size, 120.0);
        assert_relative_eq!(params.shift_factor, 0.1);
    }

    #[test]
    fn test_pupils_attached_when_configured() {
        let config = PipelineConfig {
            pupils: Some(PupilConfig::default()),
            ..PipelineConfig::default()
        };
        let mut pipeline = FramePipeline::new(
            config,
            Box::new(FixedClassifier(vec![det(100.0, 100.0, 80.0, 60.0)])),
        )
        .with_localizer(Box::new(CenterPupils));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);

        let pupils = &outcome.processed().unwrap().faces[0].pupils;
        assert_eq!(pupils.len(), 2);
        assert_relative_eq!(pupils[0].y, 94.0);
        assert_relative_eq!(pupils[0].x, 86.0);
        assert_relative_eq!(pupils[1].x, 114.0);
    }

    #[test]
    fn test_recorded_pupils_reach_face_annotations() {
        use crate::detection::infrastructure::replay_face_classifier::ReplayFaceClassifier;
        use crate::detection::infrastructure::replay_pupil_localizer::ReplayPupilLocalizer;

        let classifier = ReplayFaceClassifier::from_json_str(r#"{"0": [[100, 100, 80, 60]]}"#).unwrap();
        let localizer = ReplayPupilLocalizer::from_json_str(r#"{"0": [[95, 87]]}"#).unwrap();
        let config = PipelineConfig {
            pupils: Some(PupilConfig::default()),
            ..PipelineConfig::default()
        };
        let mut pipeline = FramePipeline::new(config, Box::new(classifier)).with_localizer(Box::new(localizer));
        let mut surface = ImageSurface::new(0, 0);

        let outcome = pipeline.process(&frame(0), &mut surface);

        let pupils = &outcome.processed().unwrap().faces[0].pupils;
        assert_eq!(pupils.len(), 1);
        assert_relative_eq!(pupils[0].y, 95.0);
        assert_relative_eq!(pupils[0].x, 87.0);
    }

    #[test]
    fn test_localizer_ignored_without_pupil_config() {
        let mut pipeline = pipeline(FixedClassifier(vec![det(100.0, 100.0, 80.0, 60.0)]))
            .with_localizer(Box::new(CenterPupils));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);
        assert!(outcome.processed().unwrap().faces[0].pupils.is_empty());
    }

    #[test]
    fn test_process_time_is_reported() {
        let mut pipeline = pipeline(FixedClassifier(Vec::new()));
        let mut surface = ImageSurface::new(0, 0);
        let outcome = pipeline.process(&frame(0), &mut surface);
        assert!(outcome.processed().unwrap().process_time_ms >= 0.0);
    }

    #[test]
    fn test_skip_reason_messages() {
        let reason = SkipReason::Readback(SurfaceError::Restricted("cross-origin".into()));
        assert_eq!(reason.to_string(), "readback failed: pixel readback refused: cross-origin");
    }
}
