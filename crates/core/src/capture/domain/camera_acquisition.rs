use super::camera_source::{CameraConstraints, CameraError, CameraSource, FacingMode, VideoStream};

/// Opens a stream, relaxing constraints until the source accepts one.
pub fn acquire_with_fallback(
    source: &dyn CameraSource,
    facing: FacingMode,
) -> Result<Box<dyn VideoStream>, CameraError> {
    let chain = CameraConstraints::fallback_chain(facing);
    let mut last = None;

    for (attempt, constraints) in chain.iter().enumerate() {
        match source.acquire(constraints) {
            Ok(stream) => {
                let (w, h) = stream.video_size();
                log::info!("Camera acquired on attempt {} ({w}x{h}, facing {facing})", attempt + 1);
                return Ok(stream);
            }
            Err(e) => {
                log::warn!("Camera attempt {} failed: {e}", attempt + 1);
                last = Some(e);
            }
        }
    }

    Err(CameraError::Exhausted {
        attempts: chain.len(),
        last: last.map(|e| e.to_string()).unwrap_or_default(),
    })
}
