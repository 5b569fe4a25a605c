//! Audio-Anomaly Detector
//!
//! Samples the microphone spectrum on a fixed cadence and averages magnitude
//! over the speech band only, ignoring mains hum below it and hiss above it.
//! A sustained counter grows while the band average sits above the volume
//! threshold and decays at half rate below it, so pauses between syllables
//! don't reset a sentence. Crossing the sustained threshold reports at most
//! once per cooldown window.

use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::AudioConfig;
use crate::detectors::{Debounce, DetectorHandle};
use crate::monitor::{InfractionKind, InfractionReporter};
use crate::sources::AudioSpectrumSource;

pub fn spawn_audio(
    config: AudioConfig,
    reporter: InfractionReporter,
    source: Arc<dyn AudioSpectrumSource>,
) -> DetectorHandle {
    let token = CancellationToken::new();
    let child = token.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.sample_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut sustained: f32 = 0.0;
        let mut cooldown = Debounce::new(config.cooldown());

        loop {
            tokio::select! {
                _ = child.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(frame) = source.sample().await else {
                        debug!("audio stream ended; stopping analysis");
                        break;
                    };

                    let level = speech_band_average(
                        &frame,
                        config.speech_band_low_bin,
                        config.speech_band_high_bin,
                    );

                    if level > config.volume_threshold {
                        sustained += config.growth_per_frame;
                    } else {
                        sustained = (sustained - config.decay_per_frame).max(0.0);
                    }

                    if sustained >= config.sustained_frames && cooldown.try_pass() {
                        reporter.report(
                            InfractionKind::AudioAnomaly,
                            Some("Sustained speech detected near the microphone.".to_string()),
                        );
                        sustained = 0.0;
                    }
                }
            }
        }
    });

    DetectorHandle::new("audio", token, task)
}

/// Average magnitude over the speech band, clamped to the frame length.
/// Frames narrower than the band contribute what they have.
fn speech_band_average(frame: &[u8], low_bin: usize, high_bin: usize) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }

    let high = high_bin.min(frame.len() - 1);
    if low_bin > high {
        return 0.0;
    }

    let band = &frame[low_bin..=high];
    band.iter().map(|&b| b as f32).sum::<f32>() / band.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_average_covers_configured_bins_only() {
        // Bins outside 2..=4 are loud; the band itself is quiet.
        let frame = [200, 200, 10, 20, 30, 200, 200];
        let level = speech_band_average(&frame, 2, 4);
        assert_eq!(level, 20.0);
    }

    #[test]
    fn band_average_clamps_to_short_frames() {
        let frame = [0, 0, 60];
        assert_eq!(speech_band_average(&frame, 2, 18), 60.0);
    }

    #[test]
    fn band_average_of_empty_frame_is_zero() {
        assert_eq!(speech_band_average(&[], 2, 18), 0.0);
        assert_eq!(speech_band_average(&[10, 20], 5, 8), 0.0);
    }
}
