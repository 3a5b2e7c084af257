//! Synchronization between the progress store and the service.
//!
//! Two background loops and one explicit operation:
//!
//! - [`run_debounced_push`] coalesces push triggers with a trailing-edge
//!   debounce and sends the snapshot as it is at send time.
//! - [`run_periodic_pull`] fetches the profile on a fixed cadence and
//!   overwrites local state with it.
//! - [`sync_now`] pushes immediately and adopts the returned document.
//!
//! Failures in the loops are logged and dropped; the next trigger or tick
//! is the retry. Pushes and pulls are not ordered against each other, so a
//! pull can overwrite local changes that have not been pushed yet.

use std::sync::Arc;
use std::time::Duration;

use batoners_core::player::{Player, ProgressSnapshot};
use batoners_core::types::now_millis;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::ProgressApi;
use crate::error::{ClientError, ClientResult};
use crate::local::LocalSnapshotStore;
use crate::store::SharedStore;

/// Everything a sync operation touches.
#[derive(Clone)]
pub struct SyncContext {
    pub store: SharedStore,
    pub api: Arc<dyn ProgressApi>,
    pub local: Option<LocalSnapshotStore>,
}

impl SyncContext {
    pub fn new(
        store: SharedStore,
        api: Arc<dyn ProgressApi>,
        local: Option<LocalSnapshotStore>,
    ) -> Self {
        Self { store, api, local }
    }

    /// Write the current snapshot to local storage, if configured.
    pub async fn save_local(&self) {
        if self.local.is_none() {
            return;
        }
        let snapshot = self.store.lock().await.snapshot();
        self.write_local(&snapshot).await;
    }

    async fn write_local(&self, snapshot: &ProgressSnapshot) {
        if let Some(local) = &self.local {
            if let Err(e) = local.save(snapshot).await {
                tracing::warn!(
                    path = %local.path().display(),
                    error = %e,
                    "Failed to save local snapshot"
                );
            }
        }
    }

    /// Push the current snapshot and any newly reached milestones.
    ///
    /// The snapshot is always written locally first. Before login nothing
    /// is sent and `Ok(None)` is returned.
    pub async fn push_once(&self) -> ClientResult<Option<Player>> {
        let (snapshot, milestones) = {
            let mut store = self.store.lock().await;
            let milestones = store.is_initialized().then(|| store.reached_milestones());
            (store.snapshot(), milestones)
        };

        self.write_local(&snapshot).await;

        let Some(milestones) = milestones else {
            tracing::debug!("Not logged in, progress kept locally");
            return Ok(None);
        };

        if !milestones.is_empty() {
            match self.api.update_achievements(&milestones).await {
                Ok(_) => tracing::info!(count = milestones.len(), "Reported achievements"),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to report achievements");
                    self.store.lock().await.requeue_achievements(milestones);
                }
            }
        }

        let player = self.api.save_progress(&snapshot.into_update()).await?;
        self.store.lock().await.record_sync(now_millis());
        tracing::debug!(batons = player.batons, "Progress pushed");
        Ok(Some(player))
    }

    /// Fetch the profile and overwrite local state with it.
    pub async fn pull_once(&self) -> ClientResult<()> {
        let player = self.api.fetch_profile().await?;
        self.store
            .lock()
            .await
            .apply_server_profile(&player, now_millis());
        self.save_local().await;
        tracing::debug!(batons = player.batons, "Profile pulled");
        Ok(())
    }
}

/// Push immediately and adopt the server's copy.
///
/// Returns `Ok(false)` without doing anything if another explicit sync is
/// still in flight.
pub async fn sync_now(ctx: &SyncContext) -> ClientResult<bool> {
    {
        let mut store = ctx.store.lock().await;
        if !store.is_initialized() {
            return Err(ClientError::NotInitialized);
        }
        if !store.try_begin_sync() {
            tracing::debug!("Sync already in progress");
            return Ok(false);
        }
    }

    let result = ctx.push_once().await;

    let mut store = ctx.store.lock().await;
    match result {
        Ok(Some(player)) => {
            let now = now_millis();
            store.apply_server_profile(&player, now);
            store.finish_sync(Some(now));
            Ok(true)
        }
        Ok(None) => {
            store.finish_sync(None);
            Err(ClientError::NotInitialized)
        }
        Err(e) => {
            store.finish_sync(None);
            tracing::warn!(error = %e, "Explicit sync failed");
            Err(e)
        }
    }
}

/// Trailing-edge debounced push loop.
///
/// Each trigger restarts the `quiet` timer; a push is sent once no trigger
/// has arrived for `quiet`. On cancellation a pending push is flushed once.
pub async fn run_debounced_push(
    ctx: SyncContext,
    mut triggers: mpsc::UnboundedReceiver<()>,
    quiet: Duration,
    cancel: CancellationToken,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        let due = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                if deadline.is_some() {
                    tracing::debug!("Flushing pending push before shutdown");
                    push_logged(&ctx).await;
                }
                break;
            }
            trigger = triggers.recv() => match trigger {
                Some(()) => deadline = Some(Instant::now() + quiet),
                None => {
                    if deadline.is_some() {
                        push_logged(&ctx).await;
                    }
                    break;
                }
            },
            _ = due => {
                deadline = None;
                push_logged(&ctx).await;
            }
        }
    }

    tracing::debug!("Debounced push loop stopped");
}

async fn push_logged(ctx: &SyncContext) {
    if let Err(e) = ctx.push_once().await {
        tracing::warn!(error = %e, "Progress push failed");
    }
}

/// Periodic profile pull. The first pull happens one `period` after start.
pub async fn run_periodic_pull(ctx: SyncContext, period: Duration, cancel: CancellationToken) {
    let period = period.max(Duration::from_millis(1));
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Periodic pull stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = ctx.pull_once().await {
                    tracing::warn!(error = %e, "Profile pull failed");
                }
            }
        }
    }
}
