//! User-Facing Notifications and Host Actions
//!
//! The aggregator only *requests* notifications; rendering belongs to the
//! host page. `TracingSink` is the default sink for hosts that just want the
//! log trail, `MemorySink` keeps a bounded in-memory tail for dashboards and
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Severity of a notification, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info = 0,
    Warning = 1,
    Critical = 2,
}

/// Transient toast content emitted on every infraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Suggested display duration for the host's toast component
    pub duration_ms: u64,
}

/// Rendering seam between the aggregator and the host page.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Host-owned terminal submission, invoked once per session after the grace
/// delay when the score ceiling is crossed.
#[async_trait]
pub trait SubmitAction: Send + Sync {
    async fn submit(&self);
}

/// Forwards notifications to `tracing` at the severity-matched level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
            Severity::Warning => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
            Severity::Critical => tracing::error!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
        }
    }
}

/// Bounded in-memory notification tail.
pub struct MemorySink {
    entries: Mutex<VecDeque<Notification>>,
    max_entries: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries: 256,
        }
    }

    /// Most recent notifications, newest first.
    pub fn recent(&self, count: usize) -> Vec<Notification> {
        self.entries
            .lock()
            .map(|entries| entries.iter().rev().take(count).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push_back(notification);
            while entries.len() > self.max_entries {
                entries.pop_front();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn memory_sink_keeps_newest_first() {
        let sink = MemorySink::new();
        for i in 0..3 {
            sink.notify(Notification {
                title: format!("n{i}"),
                description: String::new(),
                severity: Severity::Warning,
                duration_ms: 1_000,
            });
        }

        let recent = sink.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "n2");
        assert_eq!(recent[1].title, "n1");
    }

    #[test]
    fn memory_sink_is_bounded() {
        let sink = MemorySink::new();
        for i in 0..300 {
            sink.notify(Notification {
                title: format!("n{i}"),
                description: String::new(),
                severity: Severity::Info,
                duration_ms: 0,
            });
        }
        assert_eq!(sink.len(), 256);
        assert_eq!(sink.recent(1)[0].title, "n299");
    }
}
