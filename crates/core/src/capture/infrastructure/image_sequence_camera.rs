use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::capture::domain::camera_source::{
    CameraConstraints, CameraError, CameraSource, FacingMode, VideoStream,
};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

const DEFAULT_CHANNEL_CAPACITY: usize = 4;

/// A camera backed by a directory of still images, played in file-name order.
///
/// Frames are decoded on a reader thread and delivered through a bounded
/// channel, so the stream reports "not ready" until the next decode lands.
/// The directory stands for one physical camera with a fixed facing mode;
/// constraints asking for the other facing are rejected.
pub struct ImageSequenceCamera {
    dir: PathBuf,
    facing: FacingMode,
    channel_capacity: usize,
}

impl ImageSequenceCamera {
    pub fn new(dir: impl Into<PathBuf>, facing: FacingMode) -> Self {
        Self {
            dir: dir.into(),
            facing,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// Image files in `dir`, sorted by name.
pub fn list_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Scales `native` down to fit inside `max`, keeping aspect ratio.
fn fit_within(native: (u32, u32), max: Option<(u32, u32)>) -> (u32, u32) {
    let (w, h) = native;
    let Some((max_w, max_h)) = max else {
        return native;
    };
    if w <= max_w && h <= max_h {
        return native;
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    (
        ((w as f64 * scale).round() as u32).max(1),
        ((h as f64 * scale).round() as u32).max(1),
    )
}

impl CameraSource for ImageSequenceCamera {
    fn acquire(&self, constraints: &CameraConstraints) -> Result<Box<dyn VideoStream>, CameraError> {
        if let Some(facing) = constraints.facing {
            if facing != self.facing {
                return Err(CameraError::Unsatisfiable(format!(
                    "no {facing}-facing camera (have {})",
                    self.facing
                )));
            }
        }

        let paths = list_frames(&self.dir)
            .map_err(|e| CameraError::Device(format!("{}: {e}", self.dir.display())))?;
        let first = paths
            .first()
            .ok_or_else(|| CameraError::Device(format!("no frames in {}", self.dir.display())))?;
        let native = image::image_dimensions(first)
            .map_err(|e| CameraError::Device(format!("{}: {e}", first.display())))?;
        let size = fit_within(native, constraints.max_resolution);

        log::debug!(
            "Image sequence camera: {} frames from {}, {}x{}",
            paths.len(),
            self.dir.display(),
            size.0,
            size.1
        );

        let (tx, rx) = crossbeam_channel::bounded::<Frame>(self.channel_capacity);
        let cancelled = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let handle = spawn_reader(paths, size, tx, cancelled.clone(), finished.clone());

        Ok(Box::new(ImageSequenceStream {
            rx: Some(rx),
            handle: Some(handle),
            cancelled,
            finished,
            size,
            facing: self.facing,
        }))
    }
}

fn spawn_reader(
    paths: Vec<PathBuf>,
    size: (u32, u32),
    frame_tx: Sender<Frame>,
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (index, path) in paths.iter().enumerate() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let img = match image::open(path) {
                Ok(img) => img.to_rgba8(),
                Err(e) => {
                    log::warn!("Skipping unreadable frame {}: {e}", path.display());
                    continue;
                }
            };
            let img = if img.dimensions() == size {
                img
            } else {
                image::imageops::resize(&img, size.0, size.1, image::imageops::FilterType::Triangle)
            };
            let frame = Frame::rgba(img.into_raw(), size.0, size.1, index);
            if frame_tx.send(frame).is_err() {
                break;
            }
        }
        finished.store(true, Ordering::Release);
    })
}

pub struct ImageSequenceStream {
    rx: Option<Receiver<Frame>>,
    handle: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    size: (u32, u32),
    facing: FacingMode,
}

impl VideoStream for ImageSequenceStream {
    fn ready(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| !rx.is_empty())
    }

    fn next_frame(&mut self) -> Option<Frame> {
        self.rx.as_ref()?.try_recv().ok()
    }

    fn video_size(&self) -> (u32, u32) {
        self.size
    }

    fn facing(&self) -> Option<FacingMode> {
        Some(self.facing)
    }

    fn ended(&self) -> bool {
        match &self.rx {
            Some(rx) => self.finished.load(Ordering::Acquire) && rx.is_empty(),
            None => true,
        }
    }

    fn stop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        // Dropping the receiver unblocks a reader parked on a full channel.
        self.rx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Image sequence reader thread panicked");
            }
        }
    }
}

impl Drop for ImageSequenceStream {
    fn drop(&mut self) {
        self.stop();
    }
}
