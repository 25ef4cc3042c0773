pub mod detection_session;
pub mod frame_pipeline;
pub mod output_sizing;
pub mod pipeline_logger;
pub mod refresh_loop;
pub mod session_models;
