use crate::shared::detection::Detection;

/// A located pupil in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pupil {
    pub x: f64,
    pub y: f64,
}

/// A reported face in screen coordinates (`x` = column, `y` = row).
#[derive(Clone, Debug, PartialEq)]
pub struct FaceAnnotation {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub confidence: f64,
    pub pupils: Vec<Pupil>,
}

impl FaceAnnotation {
    pub fn from_detection(detection: &Detection) -> Self {
        Self {
            x: detection.col,
            y: detection.row,
            size: detection.size,
            confidence: detection.score,
            pupils: Vec::new(),
        }
    }
}
