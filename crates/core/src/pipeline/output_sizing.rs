use crate::rendering::domain::draw_surface::Placement;

/// How the display surface is sized relative to the incoming video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputSizing {
    /// Surface matches the native video size.
    #[default]
    Native,
    /// Surface has a fixed size; the frame is stretched to fill it.
    Fixed { width: u32, height: u32 },
    /// Surface has the container's size; the frame is scaled to fit and
    /// centered, leaving bars on the unused axis.
    FitTo { width: u32, height: u32 },
}

/// Resolved surface size and frame placement for one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceLayout {
    pub surface: (u32, u32),
    pub placement: Placement,
}

impl OutputSizing {
    pub fn layout(&self, native: (u32, u32)) -> SurfaceLayout {
        match *self {
            OutputSizing::Native => filled(native),
            OutputSizing::Fixed { width, height } => filled((width, height)),
            OutputSizing::FitTo { width, height } => fitted(native, (width, height)),
        }
    }
}

fn filled((width, height): (u32, u32)) -> SurfaceLayout {
    SurfaceLayout {
        surface: (width, height),
        placement: Placement {
            x: 0,
            y: 0,
            width,
            height,
        },
    }
}

fn fitted((nw, nh): (u32, u32), (cw, ch): (u32, u32)) -> SurfaceLayout {
    if nw == 0 || nh == 0 {
        return SurfaceLayout {
            surface: (cw, ch),
            placement: Placement {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            },
        };
    }

    let scale = (cw as f64 / nw as f64).min(ch as f64 / nh as f64);
    let width = ((nw as f64 * scale).round() as u32).min(cw);
    let height = ((nh as f64 * scale).round() as u32).min(ch);

    SurfaceLayout {
        surface: (cw, ch),
        placement: Placement {
            x: (cw - width) / 2,
            y: (ch - height) / 2,
            width,
            height,
        },
    }
}
