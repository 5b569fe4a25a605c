//! Scoring Aggregator
//!
//! The single writer for the cheating score. Detectors hold an
//! `InfractionReporter` handle and never touch the score cell directly; every
//! mutation funnels through `report`, which defers the actual update by one
//! scheduling turn so event-handler call sites never block on notification
//! rendering.
//!
//! Concurrency: the score increment and threshold check are computed from one
//! atomic read-modify-write, so reports interleaved in the same turn cannot
//! lose updates. The auto-submit flag flips via atomic swap, guaranteeing the
//! host action is scheduled exactly once per session.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::monitor::infraction::{InfractionEvent, InfractionKind};
use crate::monitor::notify::{Notification, NotificationSink, Severity, SubmitAction};

/// Toast duration for running warnings
const NOTIFY_DURATION_MS: u64 = 6_000;

/// Toast duration for the final, threshold-reached warning
const FINAL_NOTIFY_DURATION_MS: u64 = 8_000;

/// The cheating-score accumulator.
pub struct CheatMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: ScoringConfig,
    score: AtomicU32,
    disabled: AtomicBool,
    auto_submit_fired: AtomicBool,
    log_reports: AtomicBool,
    notifier: Arc<dyn NotificationSink>,
    submit: Arc<dyn SubmitAction>,
}

impl CheatMonitor {
    pub fn new(
        config: ScoringConfig,
        notifier: Arc<dyn NotificationSink>,
        submit: Arc<dyn SubmitAction>,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                config,
                score: AtomicU32::new(0),
                disabled: AtomicBool::new(false),
                auto_submit_fired: AtomicBool::new(false),
                log_reports: AtomicBool::new(true),
                notifier,
                submit,
            }),
        }
    }

    /// Suppress per-infraction info logging (notifications still flow).
    pub fn with_report_logging(self, log_reports: bool) -> Self {
        self.inner.log_reports.store(log_reports, Ordering::SeqCst);
        self
    }

    /// Handle detectors use to report violations.
    pub fn reporter(&self) -> InfractionReporter {
        InfractionReporter {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Raw cumulative score. May exceed the auto-submit threshold once the
    /// submission has already been scheduled.
    pub fn score(&self) -> u32 {
        self.inner.score.load(Ordering::SeqCst)
    }

    /// Score clamped to the threshold, for progress-bar display.
    pub fn display_score(&self) -> u32 {
        self.score().min(self.inner.config.auto_submit_threshold)
    }

    /// Hard gate: all subsequent reports are dropped before any state
    /// mutation. Used when the quiz is finished or submitted.
    pub fn disable(&self) {
        self.inner.disabled.store(true, Ordering::SeqCst);
        info!("cheating monitor disabled");
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.load(Ordering::SeqCst)
    }

    pub fn auto_submit_fired(&self) -> bool {
        self.inner.auto_submit_fired.load(Ordering::SeqCst)
    }
}

/// Cloneable reporting handle. This is the only capability detectors receive;
/// the score itself stays private to the aggregator.
#[derive(Clone)]
pub struct InfractionReporter {
    inner: Arc<MonitorInner>,
}

impl InfractionReporter {
    /// Report a violation. Returns immediately; the score mutation and
    /// notification run on the next scheduling turn.
    ///
    /// `message` defaults to the templated
    /// `"Infraction detected: {kind}. +{points} points."`.
    pub fn report(&self, kind: InfractionKind, message: Option<String>) {
        if self.inner.disabled.load(Ordering::SeqCst) {
            debug!(kind = kind.as_str(), "report dropped: monitoring disabled");
            return;
        }

        let event = InfractionEvent::new(kind, message);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.apply(event);
        });
    }
}

impl MonitorInner {
    fn apply(self: &Arc<Self>, event: InfractionEvent) {
        // Re-check: async detector work can resolve after quiz completion.
        if self.disabled.load(Ordering::SeqCst) {
            debug!(
                kind = event.kind.as_str(),
                "late report dropped: monitoring disabled"
            );
            return;
        }

        let points = event.kind.points();
        let new_score = self.score.fetch_add(points, Ordering::SeqCst) + points;
        let threshold = self.config.auto_submit_threshold;
        let points_left = threshold.saturating_sub(new_score);

        if self.log_reports.load(Ordering::SeqCst) {
            info!(
                kind = event.kind.as_str(),
                points,
                score = new_score,
                points_left,
                at = %event.timestamp,
                "infraction recorded"
            );
        }

        let reached = new_score >= threshold;
        let (description, severity, duration_ms) = if reached {
            (
                format!(
                    "Score limit reached. Your quiz will be submitted automatically in {} seconds.",
                    self.config.grace_delay().as_secs()
                ),
                Severity::Critical,
                FINAL_NOTIFY_DURATION_MS,
            )
        } else {
            (
                format!("Points left before auto-submit: {points_left}"),
                Severity::Warning,
                NOTIFY_DURATION_MS,
            )
        };

        self.notifier.notify(Notification {
            title: event.message,
            description,
            severity,
            duration_ms,
        });

        if reached && !self.auto_submit_fired.swap(true, Ordering::SeqCst) {
            warn!(score = new_score, threshold, "auto-submit threshold reached");

            let submit = Arc::clone(&self.submit);
            let grace = self.config.grace_delay();
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                info!("invoking host auto-submit action");
                submit.submit().await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::notify::MemorySink;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CountingSubmit {
        calls: AtomicUsize,
    }

    impl CountingSubmit {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SubmitAction for CountingSubmit {
        async fn submit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Let deferred report tasks run.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn monitor_with(
        threshold: u32,
    ) -> (CheatMonitor, Arc<MemorySink>, Arc<CountingSubmit>) {
        let sink = Arc::new(MemorySink::new());
        let submit = CountingSubmit::new();
        let config = ScoringConfig {
            auto_submit_threshold: threshold,
            grace_delay_ms: 5_000,
        };
        let monitor = CheatMonitor::new(config, sink.clone(), submit.clone());
        (monitor, sink, submit)
    }

    #[tokio::test]
    async fn score_accumulates_per_kind_weights() {
        let (monitor, _sink, _submit) = monitor_with(100);
        let reporter = monitor.reporter();

        reporter.report(InfractionKind::TabSwitch, None);
        reporter.report(InfractionKind::Screenshot, None);
        reporter.report(InfractionKind::AudioAnomaly, None);
        settle().await;

        assert_eq!(monitor.score(), 5 + 10 + 15);
    }

    #[tokio::test]
    async fn disabled_monitor_ignores_reports() {
        let (monitor, sink, _submit) = monitor_with(100);
        let reporter = monitor.reporter();

        monitor.disable();
        reporter.report(InfractionKind::AudioAnomaly, None);
        settle().await;

        assert_eq!(monitor.score(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn display_score_clamps_at_threshold() {
        let (monitor, _sink, _submit) = monitor_with(20);
        let reporter = monitor.reporter();

        reporter.report(InfractionKind::AudioAnomaly, None);
        reporter.report(InfractionKind::AudioAnomaly, None);
        settle().await;

        assert_eq!(monitor.score(), 30);
        assert_eq!(monitor.display_score(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_submit_fires_once_after_grace_delay() {
        let (monitor, _sink, submit) = monitor_with(20);
        let reporter = monitor.reporter();

        reporter.report(InfractionKind::AudioAnomaly, None);
        reporter.report(InfractionKind::AudioAnomaly, None);
        settle().await;
        assert!(monitor.auto_submit_fired());
        assert_eq!(submit.count(), 0, "submit must wait for the grace delay");

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(submit.count(), 1);

        // Further infractions past the threshold never re-trigger.
        reporter.report(InfractionKind::Screenshot, None);
        settle().await;
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(submit.count(), 1);
    }

    #[tokio::test]
    async fn notification_severity_flips_at_threshold() {
        let (monitor, sink, _submit) = monitor_with(20);
        let reporter = monitor.reporter();

        reporter.report(InfractionKind::Screenshot, None);
        settle().await;
        assert_eq!(sink.recent(1)[0].severity, Severity::Warning);
        assert_eq!(
            sink.recent(1)[0].description,
            "Points left before auto-submit: 10"
        );

        reporter.report(InfractionKind::Screenshot, None);
        settle().await;
        assert_eq!(sink.recent(1)[0].severity, Severity::Critical);
        assert_eq!(monitor.score(), 20);
    }

    #[tokio::test]
    async fn concurrent_reports_lose_no_updates() {
        let (monitor, _sink, _submit) = monitor_with(10_000);
        let mut handles = Vec::new();

        for _ in 0..50 {
            let reporter = monitor.reporter();
            handles.push(tokio::spawn(async move {
                reporter.report(InfractionKind::TabSwitch, None);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        settle().await;

        assert_eq!(monitor.score(), 50 * 5);
    }
}
