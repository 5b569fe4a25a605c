//! Scoring Core
//!
//! One shared, single-writer cheating score fed by independent detectors.
//! Detectors hold only an `InfractionReporter` callback; the host reads the
//! score and renders the notifications the aggregator requests.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ InfractionEvent  │────►│ CheatMonitor     │────►│ Notification     │
//! │ (per violation)  │     │ (score, gate,    │     │ (host-rendered)  │
//! └──────────────────┘     │  auto-submit)    │     └──────────────────┘
//!                          └──────────────────┘
//!                                   │
//!                                   ▼
//!                          ┌──────────────────┐
//!                          │ SubmitAction     │
//!                          │ (host, once,     │
//!                          │  after grace)    │
//!                          └──────────────────┘
//! ```
//!
//! ## Score Model
//!
//! - Score starts at 0 and only grows; each kind carries a fixed weight
//! - Clamped at the threshold for display, unclamped for accumulation
//! - Crossing the threshold schedules the host submit action exactly once,
//!   after a fixed grace delay
//! - A disabled monitor drops every report before any mutation

mod infraction;
mod notify;
mod score;

pub use infraction::{InfractionEvent, InfractionKind};
pub use notify::{MemorySink, Notification, NotificationSink, Severity, SubmitAction, TracingSink};
pub use score::{CheatMonitor, InfractionReporter};
