//! Periodic eviction of idle rate-limit keys.
//!
//! Without this, every client address ever seen would keep an (empty)
//! entry in the limiter map for the life of the process.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::middleware::rate_limit::RateLimiter;

/// Run the sweep loop once per rate-limit window until `cancel` fires.
pub async fn run(limiter: Arc<RateLimiter>, cancel: CancellationToken) {
    let period = limiter.config().window.max(Duration::from_secs(1));
    tracing::info!(interval_secs = period.as_secs(), "Rate limit sweep started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rate limit sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let removed = limiter.purge_idle(Instant::now());
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        remaining = limiter.tracked_keys(),
                        "Purged idle rate limit keys"
                    );
                }
            }
        }
    }
}
