//! Heuristic Detectors
//!
//! Four independent monitoring loops, each watching one browser signal and
//! reporting into the shared aggregator through an `InfractionReporter`.
//! Detectors never talk to each other and never see the score.
//!
//! Every detector is best-effort: environment failures (permission denied,
//! stream gone, unsupported API) degrade to a logged no-op. Nothing here can
//! fail the quiz session.
//!
//! Lifecycle: each `spawn` returns a [`DetectorHandle`] owning the task and
//! its cancellation token; `shutdown` stops the loop deterministically and
//! releases whatever the task held.

mod audio;
mod clipboard;
mod recording;
mod tab_switch;

pub use audio::spawn_audio;
pub use clipboard::spawn_clipboard;
pub use recording::spawn_recording;
pub use tab_switch::spawn_tab_switch;

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle on a running detector task.
pub struct DetectorHandle {
    name: &'static str,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl DetectorHandle {
    pub(crate) fn new(name: &'static str, token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self { name, token, task }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True once the loop has exited (cancelled, or its signal feed ended).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the detector loop and wait for it to release its resources.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                debug!(detector = self.name, error = %e, "detector task ended abnormally");
            }
        }
        debug!(detector = self.name, "detector stopped");
    }
}

/// Minimum-elapsed-time stamp shared by a detector's report paths.
pub(crate) struct Debounce {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Debounce {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Stamp and return true if enough time has passed since the last pass;
    /// leave the stamp untouched otherwise.
    pub(crate) fn try_pass(&mut self) -> bool {
        match self.last {
            Some(t) if t.elapsed() < self.min_interval => false,
            _ => {
                self.last = Some(Instant::now());
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn debounce_passes_then_blocks_then_passes() {
        let mut debounce = Debounce::new(Duration::from_secs(10));

        assert!(debounce.try_pass());
        assert!(!debounce.try_pass());

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(!debounce.try_pass());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(debounce.try_pass());
    }
}
