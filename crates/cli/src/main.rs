use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use facecam_core::capture::domain::camera_source::FacingMode;
use facecam_core::capture::domain::image_writer::ImageWriter;
use facecam_core::capture::infrastructure::image_file_writer::ImageFileWriter;
use facecam_core::capture::infrastructure::image_sequence_camera::ImageSequenceCamera;
use facecam_core::detection::domain::classifier::{SearchParams, WindowSizing};
use facecam_core::detection::domain::model_loader::ModelAsset;
use facecam_core::detection::infrastructure::cached_model_assets::CachedModelAssets;
use facecam_core::detection::infrastructure::replay_face_classifier::ReplayFaceClassifier;
use facecam_core::detection::infrastructure::replay_pupil_localizer::ReplayPupilLocalizer;
use facecam_core::pipeline::detection_session::DetectionSession;
use facecam_core::pipeline::frame_pipeline::{FrameOutcome, PipelineConfig, PupilConfig};
use facecam_core::pipeline::output_sizing::OutputSizing;
use facecam_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facecam_core::pipeline::refresh_loop::RefreshLoop;
use facecam_core::pipeline::session_models::SessionModels;
use facecam_core::rendering::domain::overlay_renderer::{OverlayRenderer, OverlayStyle};
use facecam_core::rendering::infrastructure::image_surface::{load_font, ImageSurface};
use facecam_core::shared::constants::{
    DEFAULT_CLUSTER_THRESHOLD, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MEMORY_WINDOW,
    DEFAULT_REFRESH_INTERVAL_MS,
};
use facecam_core::shared::crop_region::CropRegion;

/// Face detection sessions over recorded camera frames.
#[derive(Parser)]
#[command(name = "facecam")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a session over a directory of frames and save face captures.
    Run(RunArgs),
    /// Resolve model assets into the user cache, downloading if needed.
    FetchModels {
        /// Directory searched for bundled models before downloading.
        #[arg(long)]
        bundled: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Directory of frames, played in file-name order.
    frames: PathBuf,

    /// Recorded raw detections per frame index (JSON: {"0": [[row, col, size, score]]}).
    #[arg(long)]
    detections: PathBuf,

    /// Directory for face captures.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory for annotated frames.
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// Camera facing mode the frames were recorded with.
    #[arg(long, value_enum, default_value = "user")]
    facing: Facing,

    /// Clustered detections must score above this.
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence: f64,

    /// Overlap ratio above which detections are merged.
    #[arg(long, default_value_t = DEFAULT_CLUSTER_THRESHOLD)]
    overlap: f64,

    /// Frames of detection history.
    #[arg(long, default_value_t = DEFAULT_MEMORY_WINDOW)]
    memory: usize,

    /// Smallest search window in pixels.
    #[arg(long, default_value = "100")]
    min_size: f64,

    /// Largest search window in pixels.
    #[arg(long, default_value = "1000")]
    max_size: f64,

    /// Derive window bounds as fractions of the smaller surface side.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    relative_window: Option<Vec<f64>>,

    /// Output surface sizing.
    #[arg(long, value_enum, default_value = "native")]
    sizing: Sizing,

    /// Surface width for fixed or fit sizing.
    #[arg(long)]
    width: Option<u32>,

    /// Surface height for fixed or fit sizing.
    #[arg(long)]
    height: Option<u32>,

    /// Locate pupils with this many perturbations.
    #[arg(long, requires = "pupil_positions")]
    pupils: Option<usize>,

    /// Recorded pupils per frame index (JSON: {"0": [[row, col]]}).
    #[arg(long)]
    pupil_positions: Option<PathBuf>,

    /// TrueType font for overlay text.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Hide the confidence line in face labels.
    #[arg(long)]
    no_confidence: bool,

    /// Show output and video resolution in the diagnostic corner.
    #[arg(long)]
    show_resolution: bool,

    /// Refresh interval in milliseconds.
    #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL_MS)]
    interval_ms: u64,

    /// Stop after this many processed frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// End the session as cancelled (no captures are kept).
    #[arg(long)]
    cancel: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Facing {
    User,
    Environment,
}

impl From<Facing> for FacingMode {
    fn from(facing: Facing) -> Self {
        match facing {
            Facing::User => FacingMode::User,
            Facing::Environment => FacingMode::Environment,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sizing {
    Native,
    Fixed,
    Fit,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Run(args) => {
            validate(&args)?;
            run_session(&args)
        }
        Command::FetchModels { bundled } => fetch_models(bundled),
    }
}

fn run_session(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = ReplayFaceClassifier::from_json_file(&args.detections)?;
    log::info!("Loaded recorded detections for {} frames", classifier.frame_count());

    let style = OverlayStyle {
        show_confidence: !args.no_confidence,
        show_resolution: args.show_resolution,
        ..OverlayStyle::default()
    };
    let mut models = SessionModels::new(Box::new(classifier));
    if let (Some(_), Some(path)) = (args.pupils, &args.pupil_positions) {
        let localizer = ReplayPupilLocalizer::from_json_file(path)?;
        log::info!("Loaded recorded pupils for {} frames", localizer.frame_count());
        models = models.with_localizer(Box::new(localizer));
    }
    let pipeline = models
        .into_pipeline(pipeline_config(args))
        .with_renderer(OverlayRenderer::new(style))
        .with_logger(Box::new(StdoutPipelineLogger::default()));

    let mut surface = ImageSurface::new(0, 0);
    if let Some(path) = &args.font {
        surface = surface.with_font(load_font(path)?);
    }

    let facing = FacingMode::from(args.facing);
    let camera = ImageSequenceCamera::new(&args.frames, facing);
    let mut session =
        DetectionSession::start(pipeline, Box::new(camera), Box::new(surface), facing)?;

    let writer = ImageFileWriter::new();
    let mut refresh = RefreshLoop::new(Duration::from_millis(args.interval_ms));
    if let Some(max) = args.max_frames {
        refresh = refresh.with_max_cycles(max);
    }

    let exit = refresh.run(&mut session, |session, outcome| {
        if let Some(dir) = &args.annotated {
            save_annotated(&writer, dir, session, outcome);
        }
    });
    log::info!("Frame loop exited: {exit:?}");

    let outcome = if args.cancel {
        session.cancel()
    } else {
        session.finish()
    };

    match (&args.out, outcome.success()) {
        (Some(out), true) => {
            let paths = writer.write_numbered(out, "face", outcome.faces())?;
            log::info!("Saved {} face captures to {}", paths.len(), out.display());
        }
        (None, true) => log::info!("Session captured {} faces", outcome.faces().len()),
        (_, false) => log::info!("Session cancelled, no captures kept"),
    }
    Ok(())
}

fn pipeline_config(args: &RunArgs) -> PipelineConfig {
    let window_sizing = match args.relative_window.as_deref() {
        Some(&[min_fraction, max_fraction]) => WindowSizing::RelativeToSurface {
            min_fraction,
            max_fraction,
        },
        _ => WindowSizing::Fixed,
    };
    let (width, height) = (args.width.unwrap_or(0), args.height.unwrap_or(0));
    let output_sizing = match args.sizing {
        Sizing::Native => OutputSizing::Native,
        Sizing::Fixed => OutputSizing::Fixed { width, height },
        Sizing::Fit => OutputSizing::FitTo { width, height },
    };

    PipelineConfig {
        search: SearchParams {
            min_size: args.min_size,
            max_size: args.max_size,
            ..SearchParams::default()
        },
        window_sizing,
        memory_window: args.memory,
        cluster_threshold: args.overlap,
        confidence_threshold: args.confidence,
        output_sizing,
        pupils: args.pupils.map(|perturbs| PupilConfig { perturbs }),
        capture_faces: true,
    }
}

/// Saves the annotated surface. Failures are logged; the session goes on.
fn save_annotated(
    writer: &ImageFileWriter,
    dir: &Path,
    session: &DetectionSession,
    outcome: &FrameOutcome,
) {
    let Some(processed) = outcome.processed() else {
        return;
    };
    let (w, h) = session.surface().size();
    let path = dir.join(format!("frame_{:04}.png", processed.index));
    let result = session
        .surface()
        .read_pixels(CropRegion::full(w, h))
        .map_err(|e| -> Box<dyn std::error::Error> { e.into() })
        .and_then(|frame| writer.write(&path, &frame));
    if let Err(e) = result {
        log::warn!("Could not save {}: {e}", path.display());
    }
}

fn fetch_models(bundled: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let assets = CachedModelAssets::new(bundled);

    let cascade = assets.resolve(ModelAsset::Cascade)?;
    log::info!("{}: {}", ModelAsset::Cascade, cascade.display());

    match assets.resolve(ModelAsset::PupilLocalizer) {
        Ok(path) => log::info!("{}: {}", ModelAsset::PupilLocalizer, path.display()),
        Err(e) => log::warn!("{} unavailable: {e}", ModelAsset::PupilLocalizer),
    }
    Ok(())
}

fn validate(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.frames.is_dir() {
        return Err(format!("Frames directory not found: {}", args.frames.display()).into());
    }
    if !args.detections.is_file() {
        return Err(format!("Detections file not found: {}", args.detections.display()).into());
    }
    let finite = [args.confidence, args.overlap, args.min_size, args.max_size]
        .into_iter()
        .chain(args.relative_window.iter().flatten().copied())
        .all(f64::is_finite);
    if !finite {
        return Err("Thresholds, window sizes and fractions must be finite numbers".into());
    }
    if args.pupils.is_some() {
        match &args.pupil_positions {
            Some(path) if path.is_file() => {}
            Some(path) => {
                return Err(format!("Pupil positions file not found: {}", path.display()).into())
            }
            None => return Err("--pupils requires --pupil-positions".into()),
        }
    } else if args.pupil_positions.is_some() {
        log::warn!("--pupil-positions is ignored without --pupils");
    }
    if !(args.overlap > 0.0 && args.overlap <= 1.0) {
        return Err(format!("Overlap must be in (0.0, 1.0], got {}", args.overlap).into());
    }
    if args.memory == 0 {
        return Err("Memory window must be at least 1 frame".into());
    }
    if args.min_size <= 0.0 || args.max_size < args.min_size {
        return Err(format!(
            "Window sizes must satisfy 0 < min <= max, got {} and {}",
            args.min_size, args.max_size
        )
        .into());
    }
    if let Some(fractions) = &args.relative_window {
        if fractions.iter().any(|f| !(*f > 0.0 && *f <= 1.0)) || fractions[0] > fractions[1] {
            return Err(format!(
                "Relative window fractions must satisfy 0 < min <= max <= 1, got {fractions:?}"
            )
            .into());
        }
    }
    if args.sizing != Sizing::Native {
        match (args.width, args.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {}
            _ => return Err("--width and --height are required for fixed or fit sizing".into()),
        }
    }
    if args.cancel && args.out.is_some() {
        log::warn!("--out is ignored for a cancelled session");
    }
    Ok(())
}
