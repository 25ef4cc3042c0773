pub mod classifier;
pub mod detection_clusterer;
pub mod detection_memory;
pub mod eye_regions;
pub mod grayscale;
pub mod model_loader;
