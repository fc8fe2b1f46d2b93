//! Periodic simulation task.
//!
//! Owns the tick timer for a [`DigitalTwin`]. Started once at startup and
//! stopped through its cancellation token on shutdown.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::twin::DigitalTwin;

// ---

/// Spawn the tick loop. The first tick fires one full `period` after start,
/// and again one full `period` after the twin comes back online. Ticks never
/// overlap because each runs to completion inside the loop.
pub fn spawn_simulation(
    twin: Arc<DigitalTwin>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    // ---
    tokio::spawn(async move {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut offline = twin.subscribe_offline();

        tracing::info!("Simulation started, ticking every {:?}", period);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                Ok(()) = offline.changed() => {
                    if !*offline.borrow_and_update() {
                        interval.reset();
                    }
                }
                _ = interval.tick() => {
                    // `tick` is a no-op while offline.
                    if let Some(report) = twin.tick() {
                        if !report.alerts.is_empty() {
                            tracing::info!(
                                tick = report.tick,
                                "{} new alert(s) raised",
                                report.alerts.len()
                            );
                        }
                    }
                }
            }
        }

        tracing::info!("Simulation stopped");
    })
}
