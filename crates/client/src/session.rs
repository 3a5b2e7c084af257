//! Session lifecycle.
//!
//! A [`GameSession`] owns the progress store and every background task
//! (accrual, debounced push, periodic pull). All tasks share one
//! [`CancellationToken`] and are joined on [`GameSession::shutdown`].

use std::sync::Arc;

use batoners_core::types::now_millis;
use batoners_core::validation::validate_login;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::accrual;
use crate::api::ProgressApi;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::local::LocalSnapshotStore;
use crate::store::{ProgressStore, PushTrigger, SharedStore};
use crate::sync::{self, SyncContext};

pub struct GameSession {
    ctx: SyncContext,
    config: ClientConfig,
    cancel: CancellationToken,
    tasks: TaskTracker,
    pull_started: bool,
}

impl GameSession {
    /// Create the store, restore the local snapshot if one exists, and
    /// start the accrual engine and the debounced pusher.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn start(api: Arc<dyn ProgressApi>, config: ClientConfig) -> Self {
        let (trigger, triggers) = PushTrigger::channel();
        let mut store = ProgressStore::new().with_push_trigger(trigger);

        let local = config.snapshot_path.clone().map(LocalSnapshotStore::new);
        if let Some(local) = &local {
            match local.load().await {
                Ok(Some(snapshot)) => {
                    tracing::info!(path = %local.path().display(), "Restored local snapshot");
                    store.restore(snapshot);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    path = %local.path().display(),
                    error = %e,
                    "Ignoring unreadable local snapshot"
                ),
            }
        }

        let ctx = SyncContext::new(Arc::new(Mutex::new(store)), api, local);
        let cancel = CancellationToken::new();
        let tasks = TaskTracker::new();

        tasks.spawn(accrual::run(
            ctx.store.clone(),
            config.accrual_interval,
            cancel.child_token(),
        ));
        tasks.spawn(sync::run_debounced_push(
            ctx.clone(),
            triggers,
            config.push_debounce,
            cancel.child_token(),
        ));

        Self {
            ctx,
            config,
            cancel,
            tasks,
            pull_started: false,
        }
    }

    /// Log in and adopt the server profile.
    ///
    /// On success the store is marked initialized and the periodic pull is
    /// started (once per session). On failure the store stays
    /// uninitialized and the error is returned; there is no retry.
    pub async fn initialize(&mut self, telegram_id: &str, username: &str) -> ClientResult<()> {
        validate_login(telegram_id, username)?;

        let login = match self.ctx.api.login(telegram_id, username).await {
            Ok(login) => login,
            Err(e) => {
                tracing::error!(telegram_id, error = %e, "Login failed");
                return Err(e);
            }
        };

        self.ctx
            .store
            .lock()
            .await
            .apply_login(&login.user, now_millis());
        self.ctx.save_local().await;

        if !self.pull_started {
            self.tasks.spawn(sync::run_periodic_pull(
                self.ctx.clone(),
                self.config.pull_interval,
                self.cancel.child_token(),
            ));
            self.pull_started = true;
        }

        tracing::info!(telegram_id, batons = login.user.batons, "Session initialized");
        Ok(())
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.ctx.store)
    }

    pub fn api(&self) -> &Arc<dyn ProgressApi> {
        &self.ctx.api
    }

    /// See [`sync::sync_now`].
    pub async fn sync_now(&self) -> ClientResult<bool> {
        sync::sync_now(&self.ctx).await
    }

    /// Stop every task, flush a pending push, and save the local snapshot.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.tasks.close();

        if tokio::time::timeout(self.config.shutdown_timeout, self.tasks.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                timeout_secs = self.config.shutdown_timeout.as_secs(),
                "Background tasks did not stop in time"
            );
        }

        self.ctx.save_local().await;
        tracing::info!("Session shut down");
    }
}
