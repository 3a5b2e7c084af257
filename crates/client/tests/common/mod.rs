#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use batoners_client::api::{LoginResponse, ProgressApi};
use batoners_client::config::ClientConfig;
use batoners_client::error::{ClientError, ClientResult};
use batoners_client::store::{ProgressStore, PushTrigger, SharedStore};
use batoners_core::achievement::{merge_achievements, Achievement};
use batoners_core::league::League;
use batoners_core::player::{LeaderboardEntry, Player, ProgressUpdate};
use chrono::Utc;

/// In-process stand-in for the service that records every call.
pub struct FakeApi {
    pub player: Mutex<Player>,
    pub saves: Mutex<Vec<ProgressUpdate>>,
    pub reported: Mutex<Vec<Achievement>>,
    pub fail: AtomicBool,
    pub logins: AtomicUsize,
    pub pulls: AtomicUsize,
}

impl FakeApi {
    pub fn new(telegram_id: &str, username: &str) -> Arc<Self> {
        Arc::new(Self {
            player: Mutex::new(Player::new(telegram_id, username, Utc::now())),
            saves: Mutex::new(Vec::new()),
            reported: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            logins: AtomicUsize::new(0),
            pulls: AtomicUsize::new(0),
        })
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_save(&self) -> Option<ProgressUpdate> {
        self.saves.lock().unwrap().last().cloned()
    }

    pub fn pull_count(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }

    /// Change the server-side document as another device would.
    pub fn edit_player(&self, f: impl FnOnce(&mut Player)) {
        f(&mut self.player.lock().unwrap());
    }

    fn check(&self) -> ClientResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 500,
                body: r#"{"error":"boom","code":"INTERNAL_ERROR"}"#.into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressApi for FakeApi {
    async fn login(&self, _telegram_id: &str, _username: &str) -> ClientResult<LoginResponse> {
        self.check()?;
        self.logins.fetch_add(1, Ordering::SeqCst);
        Ok(LoginResponse {
            token: "fake-token".into(),
            user: self.player.lock().unwrap().clone(),
        })
    }

    async fn save_progress(&self, update: &ProgressUpdate) -> ClientResult<Player> {
        self.check()?;
        self.saves.lock().unwrap().push(update.clone());
        let mut player = self.player.lock().unwrap();
        player.apply_update(update.clone(), Utc::now());
        Ok(player.clone())
    }

    async fn fetch_profile(&self) -> ClientResult<Player> {
        self.check()?;
        self.pulls.fetch_add(1, Ordering::SeqCst);
        Ok(self.player.lock().unwrap().clone())
    }

    async fn leaderboard(
        &self,
        _league: Option<League>,
        _limit: Option<i64>,
    ) -> ClientResult<Vec<LeaderboardEntry>> {
        self.check()?;
        Ok(vec![self.player.lock().unwrap().leaderboard_entry()])
    }

    async fn update_achievements(
        &self,
        achievements: &[Achievement],
    ) -> ClientResult<Vec<Achievement>> {
        self.check()?;
        self.reported
            .lock()
            .unwrap()
            .extend(achievements.iter().cloned());
        let mut player = self.player.lock().unwrap();
        merge_achievements(&mut player.achievements, achievements.to_vec(), Utc::now());
        Ok(player.achievements.clone())
    }
}

/// Default timings with no local snapshot.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        api_url: "http://fake/api".into(),
        snapshot_path: None,
        ..ClientConfig::default()
    }
}

/// A logged-in store wired to a push trigger.
pub fn logged_in_store(api: &FakeApi) -> (SharedStore, tokio::sync::mpsc::UnboundedReceiver<()>) {
    let (trigger, rx) = PushTrigger::channel();
    let mut store = ProgressStore::new().with_push_trigger(trigger);
    store.apply_login(&api.player.lock().unwrap(), 0);
    (Arc::new(tokio::sync::Mutex::new(store)), rx)
}

pub async fn advance(secs: f64) {
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}
