//! Tab-Switch Detector
//!
//! Two-state machine over the host's page-visibility feed. Hiding the page
//! stamps the departure time; becoming visible again measures the absence.
//! Stays quiet for absences within the grace period so an accidental focus
//! flicker costs nothing; every qualifying switch is reported, no cooldown
//! beyond the grace period itself.

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::TabSwitchConfig;
use crate::detectors::DetectorHandle;
use crate::monitor::{InfractionKind, InfractionReporter};
use crate::sources::PageVisibility;

pub fn spawn_tab_switch(
    config: TabSwitchConfig,
    reporter: InfractionReporter,
    mut events: UnboundedReceiver<PageVisibility>,
) -> DetectorHandle {
    let token = CancellationToken::new();
    let child = token.clone();

    let task = tokio::spawn(async move {
        let grace = config.grace();
        let mut hidden_at: Option<Instant> = None;
        let mut switches: u32 = 0;

        loop {
            tokio::select! {
                _ = child.cancelled() => break,
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        PageVisibility::Hidden => {
                            hidden_at = Some(Instant::now());
                        }
                        PageVisibility::Visible => {
                            let Some(left_at) = hidden_at.take() else { continue };
                            let away = left_at.elapsed();

                            if away <= grace {
                                debug!(
                                    away_ms = away.as_millis() as u64,
                                    "brief focus loss ignored"
                                );
                                continue;
                            }

                            switches += 1;
                            reporter.report(
                                InfractionKind::TabSwitch,
                                Some(format!(
                                    "Tab switch #{switches} detected: away from the quiz for {:.1}s.",
                                    away.as_secs_f64()
                                )),
                            );
                        }
                    }
                }
            }
        }
    });

    DetectorHandle::new("tab_switch", token, task)
}
