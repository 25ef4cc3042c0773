pub mod constants;
pub mod crop_region;
pub mod detection;
pub mod face_annotation;
pub mod frame;
pub mod luma_frame;
pub mod model_resolver;
