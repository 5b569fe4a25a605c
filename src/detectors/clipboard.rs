//! Screenshot/Clipboard Detector
//!
//! Two signal paths into one report core: the platform print-screen key, and
//! clipboard polling for image payloads. Polled images are identified by
//! SHA-256 content hash against a seen-map with TTL eviction, so echoed reads
//! of the same clipboard entry stay silent while a genuinely new capture of
//! identical content becomes detectable again after the TTL. Both paths share
//! one debounce stamp.
//!
//! Only the first image per poll is inspected; exhaustive inspection is not
//! worth the cost. Permission or read failures leave the keyboard path live
//! and are never surfaced to the host.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ClipboardConfig;
use crate::detectors::{Debounce, DetectorHandle};
use crate::monitor::{InfractionKind, InfractionReporter};
use crate::sources::{CaptureSignal, ClipboardSource};

/// Identity assigned to an image payload that cannot be digested. Never
/// enters the seen-map, so such payloads are treated as new rather than
/// silently lost.
const UNHASHABLE_SENTINEL: &str = "unhashable";

pub fn spawn_clipboard(
    config: ClipboardConfig,
    reporter: InfractionReporter,
    source: Arc<dyn ClipboardSource>,
    mut events: UnboundedReceiver<CaptureSignal>,
) -> DetectorHandle {
    let token = CancellationToken::new();
    let child = token.clone();

    let task = tokio::spawn(async move {
        let polling_enabled = match source.request_read_permission().await {
            Ok(true) => true,
            Ok(false) => {
                debug!("clipboard read permission denied; polling path inactive");
                false
            }
            Err(e) => {
                debug!(error = %e, "clipboard permission request failed; polling path inactive");
                false
            }
        };

        let mut ticker = tokio::time::interval(config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut state = CaptureState::new(&config);

        loop {
            tokio::select! {
                _ = child.cancelled() => break,
                _ = ticker.tick(), if polling_enabled => {
                    state.poll(source.as_ref(), &reporter).await;
                }
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        CaptureSignal::PrintScreenKey => {
                            state.report_if_ready(&reporter, "Print screen key pressed.");
                        }
                        CaptureSignal::FocusRegained if polling_enabled => {
                            state.poll(source.as_ref(), &reporter).await;
                        }
                        CaptureSignal::FocusRegained => {}
                    }
                }
            }
        }
    });

    DetectorHandle::new("clipboard", token, task)
}

struct CaptureState {
    debounce: Debounce,
    /// Image hash -> expiry of its suppression window
    seen: HashMap<String, Instant>,
    ttl: std::time::Duration,
}

impl CaptureState {
    fn new(config: &ClipboardConfig) -> Self {
        Self {
            debounce: Debounce::new(config.debounce()),
            seen: HashMap::new(),
            ttl: config.seen_ttl(),
        }
    }

    async fn poll(&mut self, source: &dyn ClipboardSource, reporter: &InfractionReporter) {
        let images = match source.read_images().await {
            Ok(images) => images,
            Err(e) => {
                debug!(error = %e, "clipboard read failed; skipping poll");
                return;
            }
        };

        // First match wins.
        let Some(image) = images.first() else { return };
        let hash = digest_image(image);

        self.sweep_expired();

        if hash != UNHASHABLE_SENTINEL {
            if self.seen.contains_key(&hash) {
                return;
            }
            self.seen.insert(hash, Instant::now() + self.ttl);
        }

        self.report_if_ready(reporter, "New screenshot detected on the clipboard.");
    }

    fn report_if_ready(&mut self, reporter: &InfractionReporter, message: &str) {
        if !self.debounce.try_pass() {
            debug!("screenshot report suppressed by debounce");
            return;
        }
        reporter.report(InfractionKind::Screenshot, Some(message.to_string()));
    }

    fn sweep_expired(&mut self) {
        let now = Instant::now();
        self.seen.retain(|_, expires_at| *expires_at > now);
    }
}

/// SHA-256 hex identity of an image payload, or the sentinel for payloads
/// with nothing to digest.
fn digest_image(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        warn!("clipboard image had no payload; treating content as unseen");
        return UNHASHABLE_SENTINEL.to_string();
    }

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_per_content() {
        let a = digest_image(b"pixels");
        let b = digest_image(b"pixels");
        let c = digest_image(b"other pixels");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn empty_payload_gets_sentinel() {
        assert_eq!(digest_image(&[]), UNHASHABLE_SENTINEL);
    }

    #[tokio::test(start_paused = true)]
    async fn seen_map_sweeps_expired_entries() {
        let mut state = CaptureState::new(&ClipboardConfig::default());
        state
            .seen
            .insert("h1".to_string(), Instant::now() + std::time::Duration::from_secs(60));

        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        state.sweep_expired();
        assert!(state.seen.is_empty());
    }
}
