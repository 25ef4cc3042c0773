use crate::shared::detection::Detection;
use crate::shared::luma_frame::LumaFrame;

/// Scores one square window of a luma image.
///
/// The scoring itself comes from an unpacked cascade model and is opaque
/// to the pipeline. Non-positive scores mean the window was rejected.
pub trait RegionClassifier: Send {
    fn classify_region(&self, row: f64, col: f64, size: f64, image: &LumaFrame) -> f64;
}

/// Finds raw face candidates across a whole luma image.
///
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceClassifier: Send {
    fn detect(
        &mut self,
        image: &LumaFrame,
        params: &SearchParams,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}

/// Refines a pupil position inside an eye search window.
///
/// Returns `(row, col)`, or `(-1.0, -1.0)` when no pupil is confidently
/// located.
pub trait PupilLocalizer: Send {
    fn localize(
        &self,
        row: f64,
        col: f64,
        size: f64,
        perturbs: usize,
        image: &LumaFrame,
    ) -> (f64, f64);
}

/// Multi-scale sliding-window search parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchParams {
    /// Window advance as a fraction of the window size.
    pub shift_factor: f64,
    /// Smallest window side in pixels.
    pub min_size: f64,
    /// Largest window side in pixels.
    pub max_size: f64,
    /// Multiplicative step between successive window sizes.
    pub scale_factor: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            shift_factor: 0.1,
            min_size: 100.0,
            max_size: 1000.0,
            scale_factor: 1.1,
        }
    }
}

/// How window size bounds are chosen for a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum WindowSizing {
    /// Use `min_size`/`max_size` as given.
    #[default]
    Fixed,
    /// Bounds are fractions of the smaller surface dimension.
    RelativeToSurface { min_fraction: f64, max_fraction: f64 },
}

impl SearchParams {
    /// Resolves the window bounds for a `width x height` surface.
    pub fn for_surface(&self, sizing: WindowSizing, width: u32, height: u32) -> SearchParams {
        match sizing {
            WindowSizing::Fixed => *self,
            WindowSizing::RelativeToSurface {
                min_fraction,
                max_fraction,
            } => {
                let side = width.min(height) as f64;
                SearchParams {
                    min_size: (side * min_fraction).max(1.0),
                    max_size: (side * max_fraction).max(1.0),
                    ..*self
                }
            }
        }
    }
}
