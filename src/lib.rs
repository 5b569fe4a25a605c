//! examguard - Exam-Integrity Monitoring Engine
//!
//! Client-side heuristic monitoring for quiz sessions: independent detectors
//! watch distinct browser signals (tab visibility, microphone spectrum,
//! clipboard, main-thread load) and report weighted infractions into one
//! debounced scoring aggregator that escalates warnings and schedules an
//! automatic submission once the score ceiling is crossed.
//!
//! Heuristic and advisory by design: nothing here resists a malicious client,
//! validates server-side, or sees OS-level capture. Every detector is
//! best-effort and can never fail or block the quiz itself.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── config.rs      - Tuned defaults, env overrides, validation, tracing setup
//! ├── sources.rs     - Host-supplied capability handles (streams, signal feeds)
//! ├── monitor/       - Scoring core
//! │   ├── infraction.rs - Violation kinds, weights, events
//! │   ├── score.rs      - Aggregator: score cell, disabled gate, auto-submit
//! │   └── notify.rs     - Notifications & host-facing sinks/actions
//! ├── detectors/     - One monitoring loop per signal
//! │   ├── tab_switch.rs - Visibility state machine with grace period
//! │   ├── audio.rs      - Speech-band sustained-activity analysis
//! │   ├── clipboard.rs  - Print-screen + clipboard image hashing with TTL
//! │   └── recording.rs  - Long-task rolling-window heuristic
//! └── session.rs     - Host wiring: attach detectors, disable, teardown
//! ```

pub mod config;
pub mod detectors;
pub mod monitor;
pub mod session;
pub mod sources;

// Re-export main types for convenience
pub use config::{
    init_tracing, AudioConfig, ClipboardConfig, LoggingConfig, MonitorConfig, RecordingConfig,
    ScoringConfig, TabSwitchConfig,
};
pub use detectors::{
    spawn_audio, spawn_clipboard, spawn_recording, spawn_tab_switch, DetectorHandle,
};
pub use monitor::{
    CheatMonitor, InfractionEvent, InfractionKind, InfractionReporter, MemorySink, Notification,
    NotificationSink, Severity, SubmitAction, TracingSink,
};
pub use session::MonitoringSession;
pub use sources::{
    AudioSpectrumSource, CaptureSignal, ClipboardSource, LongTaskObservation, PageVisibility,
};
