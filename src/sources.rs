//! Capability handles supplied by the host page.
//!
//! The host owns every underlying browser resource (media streams, clipboard
//! access, visibility/key listeners, long-task instrumentation). Detectors
//! receive these as read-only handles: event enums pushed over channels for
//! listener-style signals, and async pull traits for sampled ones. Detectors
//! never start or stop the underlying streams themselves.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Page visibility transition, as delivered by the host's visibility listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageVisibility {
    Visible,
    Hidden,
}

/// Capture-related UI signals feeding the screenshot detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSignal {
    /// The platform "print screen" key was pressed.
    PrintScreenKey,
    /// The window regained focus; worth an opportunistic clipboard poll.
    FocusRegained,
}

/// One main-thread task that ran longer than the host's long-task cutoff
/// (50 ms in the original instrumentation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongTaskObservation {
    pub duration_ms: u64,
}

/// Frequency-domain view of the host's microphone stream.
///
/// Each frame is one magnitude per FFT bin, 0-255, lowest frequency first
/// (the AnalyserNode byte layout). `None` means the stream has ended and the
/// detector should stop sampling.
#[async_trait]
pub trait AudioSpectrumSource: Send + Sync {
    async fn sample(&self) -> Option<Vec<u8>>;
}

/// Read-only clipboard access.
///
/// Both operations are fallible: permission can be denied and reads can be
/// restricted by the browser at any time. Callers degrade to no detection on
/// failure rather than surfacing an error.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    /// Request read permission. `Ok(false)` means denied.
    async fn request_read_permission(&self) -> Result<bool>;

    /// Raw bytes of each image payload currently on the clipboard.
    async fn read_images(&self) -> Result<Vec<Vec<u8>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_serializes_snake_case() {
        let json = serde_json::to_string(&PageVisibility::Hidden).unwrap();
        assert_eq!(json, "\"hidden\"");
    }
}
