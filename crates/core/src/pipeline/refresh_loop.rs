use std::time::{Duration, Instant};

use crate::pipeline::detection_session::{DetectionSession, Tick};
use crate::pipeline::frame_pipeline::FrameOutcome;
use crate::shared::constants::DEFAULT_REFRESH_INTERVAL_MS;

/// Why [`RefreshLoop::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The session's liveness flag was cleared.
    Stopped,
    /// The stream ran out of frames.
    Ended,
    /// `max_cycles` processed frames were reached.
    CycleLimit,
}

/// Cooperative display-refresh scheduler.
///
/// Ticks the session once per interval on the calling thread. Cycles never
/// overlap; a tick with no ready frame costs nothing but the wait.
pub struct RefreshLoop {
    interval: Duration,
    max_cycles: Option<usize>,
}

impl RefreshLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_cycles: None,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }

    pub fn run<F>(&self, session: &mut DetectionSession, mut on_frame: F) -> LoopExit
    where
        F: FnMut(&DetectionSession, &FrameOutcome),
    {
        let mut cycles = 0;
        loop {
            let started = Instant::now();
            match session.tick() {
                Tick::Stopped => return LoopExit::Stopped,
                Tick::Ended => return LoopExit::Ended,
                Tick::NoVideo | Tick::Waiting => {}
                Tick::Frame { outcome, .. } => {
                    on_frame(session, &outcome);
                    cycles += 1;
                    if self.max_cycles.is_some_and(|max| cycles >= max) {
                        return LoopExit::CycleLimit;
                    }
                }
            }
            std::thread::sleep(self.interval.saturating_sub(started.elapsed()));
        }
    }
}

impl Default for RefreshLoop {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS))
    }
}
