//! Passive income accrual.
//!
//! Once per tick every ready card is collected into the balance. Ticks
//! that fire while nothing is ready are no-ops.

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::store::SharedStore;

/// Run the accrual loop until `cancel` is triggered.
///
/// The first collection happens one `period` after start.
pub async fn run(store: SharedStore, period: Duration, cancel: CancellationToken) {
    let period = period.max(Duration::from_millis(1));
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(period_ms = period.as_millis() as u64, "Accrual engine started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Accrual engine stopping");
                break;
            }
            _ = interval.tick() => {
                let collected = store.lock().await.collect_passive_income();
                if collected > 0.0 {
                    tracing::debug!(collected, "Accrued passive income");
                }
            }
        }
    }
}
