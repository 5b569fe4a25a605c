//! Infraction Kinds and Events
//!
//! Each detected suspicious event carries a fixed point weight. Weights are
//! deliberately coarse: frequent low-signal events (tab switches) cost little,
//! strong signals (sustained speech, recording load) cost more. Reserved kinds
//! exist for sensors that are not wired up in this engine; nothing here ever
//! emits them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of integrity violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfractionKind {
    /// Left the quiz page for longer than the grace period
    TabSwitch,
    /// Sustained speech-band activity on the microphone
    AudioAnomaly,
    /// Screenshot capture attempt (print-screen key or clipboard image)
    Screenshot,
    /// Elevated long-task load suggesting in-page recording overhead
    ScreenRecording,
    /// Reserved: more than one person on camera
    MultiplePeople,
    /// Reserved: gaze repeatedly off-screen
    EyeTracking,
    /// Reserved: phone visible on camera
    PhoneDetected,
    /// Reserved: camera face does not match the enrolled student
    FaceMismatch,
}

impl InfractionKind {
    /// Points added to the cheating score for this kind.
    pub fn points(&self) -> u32 {
        match self {
            InfractionKind::TabSwitch => 5,
            InfractionKind::AudioAnomaly => 15,
            InfractionKind::Screenshot => 10,
            InfractionKind::ScreenRecording => 15,
            InfractionKind::MultiplePeople => 20,
            InfractionKind::EyeTracking => 20,
            InfractionKind::PhoneDetected => 25,
            InfractionKind::FaceMismatch => 25,
        }
    }

    /// Stable token used in message templates and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfractionKind::TabSwitch => "tab_switch",
            InfractionKind::AudioAnomaly => "audio_anomaly",
            InfractionKind::Screenshot => "screenshot",
            InfractionKind::ScreenRecording => "screen_recording",
            InfractionKind::MultiplePeople => "multiple_people",
            InfractionKind::EyeTracking => "eye_tracking",
            InfractionKind::PhoneDetected => "phone_detected",
            InfractionKind::FaceMismatch => "face_mismatch",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            InfractionKind::TabSwitch => "Switched away from the quiz tab",
            InfractionKind::AudioAnomaly => "Sustained speech detected on the microphone",
            InfractionKind::Screenshot => "Screenshot capture attempt",
            InfractionKind::ScreenRecording => "Possible screen recording in progress",
            InfractionKind::MultiplePeople => "Multiple people detected on camera",
            InfractionKind::EyeTracking => "Gaze repeatedly off-screen",
            InfractionKind::PhoneDetected => "Phone detected on camera",
            InfractionKind::FaceMismatch => "Face does not match enrolled student",
        }
    }
}

impl fmt::Display for InfractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected violation, consumed immediately by the aggregator.
/// Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfractionEvent {
    pub kind: InfractionKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl InfractionEvent {
    /// Build an event, falling back to the templated default message when the
    /// detector supplied none.
    pub fn new(kind: InfractionKind, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| {
            format!(
                "Infraction detected: {}. +{} points.",
                kind.as_str(),
                kind.points()
            )
        });

        Self {
            kind,
            message,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_kind_points() {
        assert_eq!(InfractionKind::TabSwitch.points(), 5);
        assert_eq!(InfractionKind::AudioAnomaly.points(), 15);
        assert_eq!(InfractionKind::Screenshot.points(), 10);
        assert_eq!(InfractionKind::ScreenRecording.points(), 15);
    }

    #[test]
    fn reserved_kinds_carry_higher_weights() {
        assert_eq!(InfractionKind::MultiplePeople.points(), 20);
        assert_eq!(InfractionKind::PhoneDetected.points(), 25);
    }

    #[test]
    fn default_message_template() {
        let event = InfractionEvent::new(InfractionKind::Screenshot, None);
        assert_eq!(
            event.message,
            "Infraction detected: screenshot. +10 points."
        );
    }

    #[test]
    fn explicit_message_wins() {
        let event = InfractionEvent::new(
            InfractionKind::TabSwitch,
            Some("Tab switch #2 detected".to_string()),
        );
        assert_eq!(event.message, "Tab switch #2 detected");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&InfractionKind::ScreenRecording).unwrap();
        assert_eq!(json, "\"screen_recording\"");

        let kind: InfractionKind = serde_json::from_str("\"audio_anomaly\"").unwrap();
        assert_eq!(kind, InfractionKind::AudioAnomaly);
    }
}
