use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::capture::domain::camera_acquisition::acquire_with_fallback;
use crate::capture::domain::camera_source::{CameraError, CameraSource, FacingMode, VideoStream};
use crate::detection::domain::model_loader::{ModelAsset, ModelLoadError};
use crate::pipeline::frame_pipeline::{FrameOutcome, FramePipeline};
use crate::rendering::domain::draw_surface::DrawSurface;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to load {asset}: {reason}")]
    AssetLoad { asset: ModelAsset, reason: String },
    #[error("failed to unpack {asset}: {reason}")]
    Unpack { asset: ModelAsset, reason: String },
    #[error("camera unavailable: {0}")]
    CameraUnavailable(#[source] CameraError),
    #[error("session is not running")]
    NotRunning,
}

impl From<ModelLoadError> for SessionError {
    fn from(err: ModelLoadError) -> Self {
        match err {
            ModelLoadError::Fetch { asset, reason } => SessionError::AssetLoad { asset, reason },
            ModelLoadError::Unpack { asset, reason } => SessionError::Unpack { asset, reason },
        }
    }
}

/// What the session returns to its host when it ends.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    Completed { faces: Vec<Frame> },
    Cancelled,
}

impl SessionOutcome {
    pub fn success(&self) -> bool {
        matches!(self, SessionOutcome::Completed { .. })
    }

    pub fn faces(&self) -> &[Frame] {
        match self {
            SessionOutcome::Completed { faces } => faces,
            SessionOutcome::Cancelled => &[],
        }
    }
}

/// Result of one scheduler tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Tick {
    /// The session was torn down; no work was done.
    Stopped,
    /// No stream is attached (a camera switch failed).
    NoVideo,
    /// The stream has no new frame yet.
    Waiting,
    /// The stream will deliver no more frames.
    Ended,
    Frame {
        outcome: FrameOutcome,
        /// Milliseconds since the previous processed cycle.
        dt_ms: Option<f64>,
    },
}

/// Liveness flag shared with whoever schedules the session.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    alive: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Makes every later tick a no-op. Teardown still happens on
    /// `finish`, `cancel` or drop.
    pub fn request_stop(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// One camera session: a stream, a surface, a pipeline with its own
/// detection memory, and the face captures gathered so far.
pub struct DetectionSession {
    pipeline: FramePipeline,
    camera: Box<dyn CameraSource>,
    stream: Option<Box<dyn VideoStream>>,
    surface: Box<dyn DrawSurface>,
    facing: FacingMode,
    alive: Arc<AtomicBool>,
    captures: Vec<Frame>,
    last_cycle: Option<Instant>,
    torn_down: bool,
}

impl DetectionSession {
    /// Acquires a camera stream with constraint fallback. Fails only when
    /// every fallback level is refused.
    pub fn start(
        pipeline: FramePipeline,
        camera: Box<dyn CameraSource>,
        surface: Box<dyn DrawSurface>,
        facing: FacingMode,
    ) -> Result<Self, SessionError> {
        let stream = acquire_with_fallback(camera.as_ref(), facing)
            .map_err(SessionError::CameraUnavailable)?;
        log::info!("Detection session started (facing {facing})");

        Ok(Self {
            pipeline,
            camera,
            stream: Some(stream),
            surface,
            facing,
            alive: Arc::new(AtomicBool::new(true)),
            captures: Vec::new(),
            last_cycle: None,
            torn_down: false,
        })
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            alive: self.alive.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn has_video(&self) -> bool {
        self.stream.is_some()
    }

    pub fn captures(&self) -> &[Frame] {
        &self.captures
    }

    pub fn surface(&self) -> &dyn DrawSurface {
        self.surface.as_ref()
    }

    /// Runs at most one pipeline cycle.
    pub fn tick(&mut self) -> Tick {
        if !self.is_running() {
            return Tick::Stopped;
        }
        let Some(stream) = self.stream.as_mut() else {
            return Tick::NoVideo;
        };
        if !stream.ready() {
            return if stream.ended() { Tick::Ended } else { Tick::Waiting };
        }
        let Some(frame) = stream.next_frame() else {
            return Tick::Waiting;
        };

        let now = Instant::now();
        let dt_ms = self
            .last_cycle
            .map(|prev| now.duration_since(prev).as_secs_f64() * 1000.0);
        self.last_cycle = Some(now);

        let outcome = self.pipeline.process(&frame, self.surface.as_mut());
        if let FrameOutcome::Processed(processed) = &outcome {
            self.captures.extend(processed.captures.iter().cloned());
        }
        Tick::Frame { outcome, dt_ms }
    }

    /// Toggles the facing mode: stops the current stream, resets detection
    /// memory and reacquires with fallback. On failure the session keeps
    /// running without video.
    pub fn switch_camera(&mut self) -> Result<FacingMode, SessionError> {
        if !self.is_running() {
            return Err(SessionError::NotRunning);
        }
        let facing = self.facing.toggled();
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        self.pipeline.reset_memory();
        self.last_cycle = None;
        self.facing = facing;

        match acquire_with_fallback(self.camera.as_ref(), facing) {
            Ok(stream) => {
                log::info!("Switched camera to {facing}");
                self.stream = Some(stream);
                Ok(facing)
            }
            Err(e) => {
                log::warn!("Camera switch to {facing} failed: {e}");
                Err(SessionError::CameraUnavailable(e))
            }
        }
    }

    pub fn reset_memory(&mut self) {
        self.pipeline.reset_memory();
    }

    /// Ends the session, handing over every capture gathered.
    pub fn finish(mut self) -> SessionOutcome {
        self.teardown();
        let faces = std::mem::take(&mut self.captures);
        log::info!("Detection session finished with {} captures", faces.len());
        SessionOutcome::Completed { faces }
    }

    /// Ends the session, discarding captures.
    pub fn cancel(mut self) -> SessionOutcome {
        self.teardown();
        self.captures.clear();
        log::info!("Detection session cancelled");
        SessionOutcome::Cancelled
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.alive.store(false, Ordering::Release);
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        self.surface.release();
        self.pipeline.logger().summary();
    }
}

impl Drop for DetectionSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
