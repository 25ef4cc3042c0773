pub const CASCADE_MODEL_NAME: &str = "facefinder";
pub const CASCADE_MODEL_URL: &str =
    "https://raw.githubusercontent.com/nenadmarkus/pico/c2e81f9d23cc11d1a612fd21e4f9de0921a5d0d9/rnt/cascades/facefinder";

/// Shipped with the app bundle; there is no download location.
pub const PUPLOC_MODEL_NAME: &str = "puploc.bin";

/// Frames of raw detections retained by the detection memory.
pub const DEFAULT_MEMORY_WINDOW: usize = 5;

/// Overlap ratio above which two detections belong to the same cluster.
pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 0.2;

/// Clustered detections must score strictly above this to be reported.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 50.0;

/// Random perturbations the pupil localizer averages over.
pub const DEFAULT_PUPIL_PERTURBS: usize = 63;

/// Display refresh interval of the frame loop (~60 Hz).
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 16;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
