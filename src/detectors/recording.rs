//! Screen-Recording Heuristic Detector
//!
//! Proxy signal: encoding overhead from an in-page recorder shows up as a
//! higher rate of long main-thread tasks. The host's instrumentation pushes
//! one observation per task over 50 ms; this detector keeps a rolling window
//! of observation times and reports when the window fills past the threshold.
//!
//! Known limitation, accepted as-is: capture that runs outside the page's
//! process (OS hotkeys, external tools, another application) adds no load
//! here and is invisible to this heuristic.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::RecordingConfig;
use crate::detectors::{Debounce, DetectorHandle};
use crate::monitor::{InfractionKind, InfractionReporter};
use crate::sources::LongTaskObservation;

pub fn spawn_recording(
    config: RecordingConfig,
    reporter: InfractionReporter,
    mut observations: UnboundedReceiver<LongTaskObservation>,
) -> DetectorHandle {
    let token = CancellationToken::new();
    let child = token.clone();

    let task = tokio::spawn(async move {
        let window = config.window();
        let mut ticker = tokio::time::interval(config.check_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut recent: VecDeque<Instant> = VecDeque::new();
        let mut debounce = Debounce::new(config.debounce());

        loop {
            tokio::select! {
                _ = child.cancelled() => break,
                observation = observations.recv() => {
                    let Some(observation) = observation else { break };
                    let now = Instant::now();
                    recent.push_back(now);
                    prune(&mut recent, now, window);
                    debug!(
                        duration_ms = observation.duration_ms,
                        in_window = recent.len(),
                        "long task observed"
                    );
                }
                _ = ticker.tick() => {
                    let now = Instant::now();
                    prune(&mut recent, now, window);

                    if recent.len() >= config.long_task_threshold && debounce.try_pass() {
                        reporter.report(
                            InfractionKind::ScreenRecording,
                            Some(format!(
                                "Elevated main-thread load: {} long tasks in the last {}s (possible screen recording).",
                                recent.len(),
                                window.as_secs()
                            )),
                        );
                    }
                }
            }
        }
    });

    DetectorHandle::new("recording", token, task)
}

fn prune(recent: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = recent.front() {
        if now.duration_since(front) > window {
            recent.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn prune_drops_only_stale_entries() {
        let window = Duration::from_secs(10);
        let mut recent = VecDeque::new();

        recent.push_back(Instant::now());
        tokio::time::advance(Duration::from_secs(8)).await;
        recent.push_back(Instant::now());
        tokio::time::advance(Duration::from_secs(4)).await;

        // First entry is now 12s old, second 4s old.
        prune(&mut recent, Instant::now(), window);
        assert_eq!(recent.len(), 1);
    }
}
