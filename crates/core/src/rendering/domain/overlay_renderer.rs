use crate::shared::face_annotation::FaceAnnotation;

use super::draw_surface::{Color, DrawSurface};

const LABEL_PADDING: f64 = 4.0;
const LABEL_LINE_HEIGHT: f64 = 16.0;
const DIAGNOSTIC_X: f64 = 10.0;
const DIAGNOSTIC_FIRST_BASELINE: f64 = 20.0;
const DIAGNOSTIC_LINE_SPACING: f64 = 25.0;

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayStyle {
    pub stroke: Color,
    pub label_fill: Color,
    pub label_text: Color,
    pub diagnostic_text: Color,
    pub line_width: f64,
    pub label_font_px: f64,
    pub diagnostic_font_px: f64,
    pub pupil_radius: f64,
    pub show_labels: bool,
    pub show_confidence: bool,
    pub show_resolution: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke: Color::RED,
            label_fill: Color::rgba(255, 0, 0, 0.5),
            label_text: Color::WHITE,
            diagnostic_text: Color::YELLOW,
            line_width: 3.0,
            label_font_px: 14.0,
            diagnostic_font_px: 18.0,
            pupil_radius: 2.0,
            show_labels: true,
            show_confidence: true,
            show_resolution: false,
        }
    }
}

/// Output and native video resolution, for the diagnostic line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolutions {
    pub output: (u32, u32),
    pub native: (u32, u32),
}

/// Per-cycle figures shown in the diagnostic corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayReport {
    pub process_time_ms: f64,
    pub resolutions: Resolutions,
}

/// Draws face annotations and cycle diagnostics onto a surface.
///
/// Read-only with respect to detections: rendering never feeds back into
/// the pipeline.
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn render(&self, surface: &mut dyn DrawSurface, faces: &[FaceAnnotation], report: &OverlayReport) {
        for face in faces {
            self.draw_face(surface, face);
        }
        self.draw_diagnostics(surface, faces.len(), report);
    }

    fn draw_face(&self, surface: &mut dyn DrawSurface, face: &FaceAnnotation) {
        let style = &self.style;
        surface.stroke_circle(face.x, face.y, face.size / 2.0, style.line_width, style.stroke);

        if style.show_labels {
            self.draw_label(surface, face);
        }

        for pupil in &face.pupils {
            surface.stroke_circle(pupil.x, pupil.y, style.pupil_radius, style.line_width, style.stroke);
        }
    }

    /// Label block anchored at the top-left of the face's bounding square,
    /// stacked upward so it never covers the face.
    fn draw_label(&self, surface: &mut dyn DrawSurface, face: &FaceAnnotation) {
        let style = &self.style;
        let lines = self.label_lines(face);
        let n = lines.len() as f64;

        let max_width = lines
            .iter()
            .map(|line| surface.measure_text(line, style.label_font_px))
            .fold(0.0, f64::max);

        let bg_x = face.x - face.size / 2.0;
        let bg_y = face.y - face.size / 2.0 - n * (LABEL_LINE_HEIGHT + LABEL_PADDING);

        surface.fill_rect(
            bg_x,
            bg_y,
            max_width + LABEL_PADDING * 2.0,
            n * (LABEL_LINE_HEIGHT + LABEL_PADDING),
            style.label_fill,
        );

        for (i, line) in lines.iter().enumerate() {
            let i = i as f64;
            let baseline = bg_y + LABEL_LINE_HEIGHT * (i + 1.0) + LABEL_PADDING * i;
            surface.fill_text(line, bg_x + LABEL_PADDING, baseline, style.label_font_px, style.label_text);
        }
    }

    fn label_lines(&self, face: &FaceAnnotation) -> Vec<String> {
        let mut lines = vec![
            format!("Size: {} px", face.size.round()),
            format!("Pos: ({}, {})", face.x.round(), face.y.round()),
        ];
        if self.style.show_confidence {
            lines.push(format!("Conf: {:.1}", face.confidence));
        }
        lines
    }

    fn draw_diagnostics(&self, surface: &mut dyn DrawSurface, face_count: usize, report: &OverlayReport) {
        let style = &self.style;
        let mut lines = vec![
            format!("Process time: {:.1} ms", report.process_time_ms),
            format!("Faces detected: {face_count}"),
        ];
        if style.show_resolution {
            let Resolutions { output, native } = report.resolutions;
            lines.push(format!(
                "Output: {}x{} | Video: {}x{}",
                output.0, output.1, native.0, native.1
            ));
        }

        for (i, line) in lines.iter().enumerate() {
            let baseline = DIAGNOSTIC_FIRST_BASELINE + DIAGNOSTIC_LINE_SPACING * i as f64;
            surface.fill_text(line, DIAGNOSTIC_X, baseline, style.diagnostic_font_px, style.diagnostic_text);
        }
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}
