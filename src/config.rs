use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Configuration for the exam-integrity monitoring engine.
///
/// Defaults carry the tuned constants from production use; `from_env` layers
/// environment overrides on top for the operationally interesting knobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Scoring aggregator configuration
    pub scoring: ScoringConfig,
    /// Tab-switch detector configuration
    pub tab_switch: TabSwitchConfig,
    /// Audio-anomaly detector configuration
    pub audio: AudioConfig,
    /// Screenshot/clipboard detector configuration
    pub clipboard: ClipboardConfig,
    /// Screen-recording heuristic configuration
    pub recording: RecordingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Cumulative score at which the quiz is auto-submitted
    pub auto_submit_threshold: u32,
    /// Delay between crossing the threshold and invoking the host submit action
    pub grace_delay_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            auto_submit_threshold: 100,
            grace_delay_ms: 5_000,
        }
    }
}

impl ScoringConfig {
    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabSwitchConfig {
    /// Time away tolerated without a report (accidental focus loss)
    pub grace_ms: u64,
}

impl Default for TabSwitchConfig {
    fn default() -> Self {
        Self { grace_ms: 1_000 }
    }
}

impl TabSwitchConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Spectrum sampling period, deliberately decoupled from display refresh
    pub sample_interval_ms: u64,
    /// First FFT bin of the speech band (inclusive)
    pub speech_band_low_bin: usize,
    /// Last FFT bin of the speech band (inclusive). Bins 2..=18 approximate
    /// 300-3400 Hz at 48 kHz with fftSize 256, skipping mains hum below and
    /// hiss above.
    pub speech_band_high_bin: usize,
    /// Band-average magnitude (0-255 scale) above which a frame counts as speech
    pub volume_threshold: f32,
    /// Sustained-counter growth per above-threshold frame
    pub growth_per_frame: f32,
    /// Sustained-counter decay per below-threshold frame. Slower than growth
    /// so inter-syllable pauses don't break a sentence apart. Tuned constant,
    /// not load-bearing.
    pub decay_per_frame: f32,
    /// Counter value that triggers a report (~750 ms of activity at 16 ms frames)
    pub sustained_frames: f32,
    /// Minimum time between audio infractions
    pub cooldown_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 16,
            speech_band_low_bin: 2,
            speech_band_high_bin: 18,
            volume_threshold: 45.0,
            growth_per_frame: 1.0,
            decay_per_frame: 0.5,
            sustained_frames: 45.0,
            cooldown_ms: 10_000,
        }
    }
}

impl AudioConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Clipboard poll period
    pub poll_interval_ms: u64,
    /// Minimum time between screenshot infractions, shared by both signal paths
    pub debounce_ms: u64,
    /// How long a seen image hash suppresses re-reports of identical content
    pub seen_ttl_ms: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            debounce_ms: 10_000,
            seen_ttl_ms: 60_000,
        }
    }
}

impl ClipboardConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn seen_ttl(&self) -> Duration {
        Duration::from_millis(self.seen_ttl_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Rolling window over long-task observations
    pub window_ms: u64,
    /// How often the window is evaluated
    pub check_interval_ms: u64,
    /// Long-task count within the window that triggers a report
    pub long_task_threshold: usize,
    /// Minimum time between screen-recording infractions
    pub debounce_ms: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            window_ms: 10_000,
            check_interval_ms: 10_000,
            long_task_threshold: 5,
            debounce_ms: 30_000,
        }
    }
}

impl RecordingConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log every accepted infraction at info level
    pub log_reports: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_reports: true,
        }
    }
}

impl MonitorConfig {
    /// Load defaults with `EXAMGUARD_*` environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(level) = env::var("EXAMGUARD_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(threshold) = env::var("EXAMGUARD_SCORE_THRESHOLD") {
            config.scoring.auto_submit_threshold = threshold
                .parse()
                .context("EXAMGUARD_SCORE_THRESHOLD must be an integer")?;
        }

        if let Ok(delay) = env::var("EXAMGUARD_GRACE_DELAY_MS") {
            config.scoring.grace_delay_ms = delay
                .parse()
                .context("EXAMGUARD_GRACE_DELAY_MS must be an integer")?;
        }

        if let Ok(threshold) = env::var("EXAMGUARD_AUDIO_VOLUME_THRESHOLD") {
            config.audio.volume_threshold = threshold
                .parse()
                .context("EXAMGUARD_AUDIO_VOLUME_THRESHOLD must be a number")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject tunings that would make a detector or the aggregator inert in
    /// a way the host did not ask for.
    pub fn validate(&self) -> Result<()> {
        if self.scoring.auto_submit_threshold == 0 {
            return Err(anyhow!("scoring.auto_submit_threshold must be positive"));
        }
        if self.audio.sample_interval_ms == 0 {
            return Err(anyhow!("audio.sample_interval_ms must be positive"));
        }
        if self.audio.speech_band_low_bin > self.audio.speech_band_high_bin {
            return Err(anyhow!(
                "audio speech band is inverted: low bin {} > high bin {}",
                self.audio.speech_band_low_bin,
                self.audio.speech_band_high_bin
            ));
        }
        if self.audio.sustained_frames <= 0.0 || self.audio.growth_per_frame <= 0.0 {
            return Err(anyhow!(
                "audio sustained_frames and growth_per_frame must be positive"
            ));
        }
        if self.clipboard.poll_interval_ms == 0 {
            return Err(anyhow!("clipboard.poll_interval_ms must be positive"));
        }
        if self.recording.long_task_threshold == 0 {
            return Err(anyhow!("recording.long_task_threshold must be positive"));
        }
        if self.recording.window_ms == 0 || self.recording.check_interval_ms == 0 {
            return Err(anyhow!(
                "recording.window_ms and check_interval_ms must be positive"
            ));
        }
        Ok(())
    }
}

/// Install the global tracing subscriber per the logging configuration.
///
/// `RUST_LOG` wins over the configured level when set. Call once from the
/// host; a second call reports an error instead of panicking.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(MonitorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_threshold() {
        let mut config = MonitorConfig::default();
        config.scoring.auto_submit_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_speech_band() {
        let mut config = MonitorConfig::default();
        config.audio.speech_band_low_bin = 20;
        config.audio.speech_band_high_bin = 4;
        assert!(config.validate().is_err());
    }

    // One test owns all EXAMGUARD_* variables; the environment is
    // process-global and tests run in parallel.
    #[test]
    fn env_overrides_apply_and_bad_values_error() {
        env::set_var("EXAMGUARD_SCORE_THRESHOLD", "80");
        env::set_var("EXAMGUARD_GRACE_DELAY_MS", "2500");

        let config = MonitorConfig::from_env().unwrap();
        assert_eq!(config.scoring.auto_submit_threshold, 80);
        assert_eq!(config.scoring.grace_delay_ms, 2_500);

        env::set_var("EXAMGUARD_AUDIO_VOLUME_THRESHOLD", "loud");
        assert!(MonitorConfig::from_env().is_err());

        env::remove_var("EXAMGUARD_SCORE_THRESHOLD");
        env::remove_var("EXAMGUARD_GRACE_DELAY_MS");
        env::remove_var("EXAMGUARD_AUDIO_VOLUME_THRESHOLD");
    }

    #[test]
    fn duration_accessors() {
        let config = MonitorConfig::default();
        assert_eq!(config.scoring.grace_delay(), Duration::from_secs(5));
        assert_eq!(config.clipboard.seen_ttl(), Duration::from_secs(60));
        assert_eq!(config.recording.debounce(), Duration::from_secs(30));
    }
}
