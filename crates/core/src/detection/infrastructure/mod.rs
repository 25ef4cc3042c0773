pub mod cached_model_assets;
pub mod cascade_scanner;
pub mod replay_face_classifier;
pub mod replay_pupil_localizer;
