use std::fmt;

use thiserror::Error;

use crate::shared::frame::Frame;

/// Which way the camera faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Requested stream properties. `None` leaves a property unconstrained.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConstraints {
    pub ideal_resolution: Option<(u32, u32)>,
    pub max_resolution: Option<(u32, u32)>,
    pub facing: Option<FacingMode>,
    pub ideal_fps: Option<f64>,
    pub max_fps: Option<f64>,
}

impl CameraConstraints {
    /// Full constraint set: 1280x720 ideal, 1920x1080 max, 30 fps ideal, 60 max.
    pub fn ideal(facing: FacingMode) -> Self {
        Self {
            ideal_resolution: Some((1280, 720)),
            max_resolution: Some((1920, 1080)),
            facing: Some(facing),
            ideal_fps: Some(30.0),
            max_fps: Some(60.0),
        }
    }

    pub fn facing_only(facing: FacingMode) -> Self {
        Self {
            facing: Some(facing),
            ..Self::unconstrained()
        }
    }

    pub fn unconstrained() -> Self {
        Self {
            ideal_resolution: None,
            max_resolution: None,
            facing: None,
            ideal_fps: None,
            max_fps: None,
        }
    }

    /// Progressively relaxed constraint sets, strictest first.
    pub fn fallback_chain(facing: FacingMode) -> [Self; 3] {
        [
            Self::ideal(facing),
            Self::facing_only(facing),
            Self::unconstrained(),
        ]
    }
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self::ideal(FacingMode::default())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("constraints cannot be satisfied: {0}")]
    Unsatisfiable(String),
    #[error("camera device error: {0}")]
    Device(String),
    #[error("no camera after {attempts} attempts, last error: {last}")]
    Exhausted { attempts: usize, last: String },
}

/// A live video stream delivering color frames.
pub trait VideoStream: Send {
    /// True when a new frame is available without blocking.
    fn ready(&self) -> bool;

    /// Takes the latest frame, if one is ready.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Native `(width, height)` of delivered frames.
    fn video_size(&self) -> (u32, u32);

    fn facing(&self) -> Option<FacingMode>;

    /// True once the source can deliver no further frames.
    fn ended(&self) -> bool {
        false
    }

    /// Releases the underlying device. Idempotent.
    fn stop(&mut self);
}

/// Opens video streams under a constraint set.
pub trait CameraSource: Send {
    fn acquire(&self, constraints: &CameraConstraints) -> Result<Box<dyn VideoStream>, CameraError>;
}
