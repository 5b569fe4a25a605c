//! Monitoring Session
//!
//! The host page's single handle on the engine: constructs the aggregator,
//! attaches detectors around the capability handles the host supplies, and
//! tears everything down deterministically when the quiz ends.
//!
//! The host owns lifecycle: it decides when monitoring starts, disables it on
//! quiz completion, and supplies the media/permission handles and the final
//! submission action. Detectors attached after `disable` never start.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::detectors::{
    spawn_audio, spawn_clipboard, spawn_recording, spawn_tab_switch, DetectorHandle,
};
use crate::monitor::{CheatMonitor, InfractionReporter, NotificationSink, SubmitAction};
use crate::sources::{
    AudioSpectrumSource, CaptureSignal, ClipboardSource, LongTaskObservation, PageVisibility,
};

pub struct MonitoringSession {
    config: MonitorConfig,
    monitor: CheatMonitor,
    handles: Vec<DetectorHandle>,
    audio_attached: bool,
}

impl MonitoringSession {
    pub fn new(
        config: MonitorConfig,
        notifier: Arc<dyn NotificationSink>,
        submit: Arc<dyn SubmitAction>,
    ) -> Result<Self> {
        config.validate()?;

        let monitor = CheatMonitor::new(config.scoring.clone(), notifier, submit)
            .with_report_logging(config.logging.log_reports);

        info!(
            threshold = config.scoring.auto_submit_threshold,
            grace_delay_ms = config.scoring.grace_delay_ms,
            "monitoring session created"
        );

        Ok(Self {
            config,
            monitor,
            handles: Vec::new(),
            audio_attached: false,
        })
    }

    /// Reporting handle, for hosts wiring sensors of their own.
    pub fn reporter(&self) -> InfractionReporter {
        self.monitor.reporter()
    }

    pub fn score(&self) -> u32 {
        self.monitor.score()
    }

    pub fn display_score(&self) -> u32 {
        self.monitor.display_score()
    }

    pub fn is_disabled(&self) -> bool {
        self.monitor.is_disabled()
    }

    pub fn auto_submit_fired(&self) -> bool {
        self.monitor.auto_submit_fired()
    }

    /// Stop scoring without tearing detectors down. Detector loops keep
    /// running until `shutdown`, but every report they make is dropped.
    pub fn disable(&self) {
        self.monitor.disable();
    }

    /// Start the tab-switch detector. Returns the sender the host feeds with
    /// visibility transitions, or `None` once monitoring is disabled.
    pub fn attach_tab_switch(&mut self) -> Option<UnboundedSender<PageVisibility>> {
        if self.monitor.is_disabled() {
            debug!("tab-switch attach ignored: monitoring disabled");
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.handles.push(spawn_tab_switch(
            self.config.tab_switch.clone(),
            self.monitor.reporter(),
            rx,
        ));
        info!("tab-switch detector attached");
        Some(tx)
    }

    /// Start audio analysis over the supplied microphone spectrum handle.
    ///
    /// Idempotent: inert without a source, a no-op while an analysis loop
    /// already exists, a no-op once disabled. Returns whether a loop started.
    pub fn attach_audio(&mut self, source: Option<Arc<dyn AudioSpectrumSource>>) -> bool {
        if self.monitor.is_disabled() {
            debug!("audio attach ignored: monitoring disabled");
            return false;
        }
        let Some(source) = source else {
            debug!("audio attach skipped: no stream supplied");
            return false;
        };
        if self.audio_attached {
            debug!("audio analysis already running; ignoring duplicate setup");
            return false;
        }

        self.handles.push(spawn_audio(
            self.config.audio.clone(),
            self.monitor.reporter(),
            source,
        ));
        self.audio_attached = true;
        info!("audio-anomaly detector attached");
        true
    }

    /// Start the screenshot/clipboard detector. Returns the sender the host
    /// feeds with print-screen and focus signals.
    pub fn attach_clipboard(
        &mut self,
        source: Arc<dyn ClipboardSource>,
    ) -> Option<UnboundedSender<CaptureSignal>> {
        if self.monitor.is_disabled() {
            debug!("clipboard attach ignored: monitoring disabled");
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.handles.push(spawn_clipboard(
            self.config.clipboard.clone(),
            self.monitor.reporter(),
            source,
            rx,
        ));
        info!("screenshot/clipboard detector attached");
        Some(tx)
    }

    /// Start the screen-recording heuristic. Returns the sender the host
    /// feeds with long-task observations.
    pub fn attach_recording(&mut self) -> Option<UnboundedSender<LongTaskObservation>> {
        if self.monitor.is_disabled() {
            debug!("recording attach ignored: monitoring disabled");
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.handles.push(spawn_recording(
            self.config.recording.clone(),
            self.monitor.reporter(),
            rx,
        ));
        info!("screen-recording detector attached");
        Some(tx)
    }

    /// Number of detector tasks currently attached.
    pub fn detector_count(&self) -> usize {
        self.handles.len()
    }

    /// Disable scoring and stop every detector loop, waiting for each to
    /// release its resources.
    pub async fn shutdown(mut self) {
        self.monitor.disable();
        for handle in self.handles.drain(..) {
            handle.shutdown().await;
        }
        info!("monitoring session shut down");
    }
}
