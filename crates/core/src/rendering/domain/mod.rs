pub mod draw_surface;
pub mod overlay_renderer;
