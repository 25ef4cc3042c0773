pub mod camera_acquisition;
pub mod camera_source;
pub mod image_writer;
