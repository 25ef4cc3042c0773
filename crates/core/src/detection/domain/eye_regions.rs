use crate::shared::detection::Detection;
use crate::shared::face_annotation::Pupil;
use crate::shared::luma_frame::LumaFrame;

use super::classifier::PupilLocalizer;

/// Eye search window centers sit this far above the face center.
const EYE_ROW_OFFSET: f64 = 0.075;
/// Horizontal offset of each eye window from the face center.
const EYE_COL_OFFSET: f64 = 0.175;
/// Eye window side relative to the face size.
const EYE_SIZE: f64 = 0.35;

/// A square window in which the localizer searches for one pupil.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeRegion {
    pub row: f64,
    pub col: f64,
    pub size: f64,
}

/// Left and right eye search windows for a face, in image coordinates.
pub fn eye_regions(face: &Detection) -> [EyeRegion; 2] {
    let row = face.row - EYE_ROW_OFFSET * face.size;
    let size = EYE_SIZE * face.size;
    [
        EyeRegion {
            row,
            col: face.col - EYE_COL_OFFSET * face.size,
            size,
        },
        EyeRegion {
            row,
            col: face.col + EYE_COL_OFFSET * face.size,
            size,
        },
    ]
}

/// Runs the localizer on both eye windows and keeps the confident hits.
pub fn locate_pupils(
    localizer: &dyn PupilLocalizer,
    face: &Detection,
    perturbs: usize,
    image: &LumaFrame,
) -> Vec<Pupil> {
    eye_regions(face)
        .iter()
        .filter_map(|eye| {
            let (row, col) = localizer.localize(eye.row, eye.col, eye.size, perturbs, image);
            (row >= 0.0 && col >= 0.0).then_some(Pupil { x: col, y: row })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    struct CenterLocalizer {
        calls: Mutex<Vec<(f64, f64, f64, usize)>>,
    }

    impl PupilLocalizer for CenterLocalizer {
        fn localize(
            &self,
            row: f64,
            col: f64,
            size: f64,
            perturbs: usize,
            _image: &LumaFrame,
        ) -> (f64, f64) {
            self.calls.lock().unwrap().push((row, col, size, perturbs));
            (row, col)
        }
    }

    struct LeftOnlyLocalizer;

    impl PupilLocalizer for LeftOnlyLocalizer {
        fn localize(&self, row: f64, col: f64, _: f64, _: usize, _: &LumaFrame) -> (f64, f64) {
            if col < 100.0 {
                (row, col)
            } else {
                (-1.0, -1.0)
            }
        }
    }

    fn image() -> LumaFrame {
        LumaFrame::new(vec![0; 4], 2, 2, 0)
    }

    #[test]
    fn test_eye_regions_geometry() {
        let [left, right] = eye_regions(&Detection::new(100.0, 100.0, 80.0, 60.0));
        assert_relative_eq!(left.row, 94.0, epsilon = 1e-9);
        assert_relative_eq!(left.col, 86.0, epsilon = 1e-9);
        assert_relative_eq!(left.size, 28.0, epsilon = 1e-9);
        assert_relative_eq!(right.row, 94.0, epsilon = 1e-9);
        assert_relative_eq!(right.col, 114.0, epsilon = 1e-9);
        assert_relative_eq!(right.size, 28.0, epsilon = 1e-9);
    }

    #[test]
    fn test_locate_pupils_queries_both_eyes_with_perturbs() {
        let localizer = CenterLocalizer {
            calls: Mutex::new(Vec::new()),
        };
        let pupils = locate_pupils(&localizer, &Detection::new(100.0, 100.0, 80.0, 60.0), 63, &image());

        assert_eq!(pupils.len(), 2);
        assert_relative_eq!(pupils[0].x, 86.0, epsilon = 1e-9);
        assert_relative_eq!(pupils[0].y, 94.0, epsilon = 1e-9);
        let calls = localizer.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.3 == 63));
    }

    #[test]
    fn test_unlocated_pupils_are_dropped() {
        let pupils = locate_pupils(&LeftOnlyLocalizer, &Detection::new(100.0, 100.0, 80.0, 60.0), 63, &image());
        assert_eq!(pupils.len(), 1);
        assert_relative_eq!(pupils[0].x, 86.0, epsilon = 1e-9);
    }
}
