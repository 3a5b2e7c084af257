//! Storage seam for player documents.
//!
//! Handlers depend on `Arc<dyn PlayerStore>` so the service can run
//! against Postgres in production and against [`MemoryPlayerStore`] in
//! development and integration tests. Both backends share the same
//! semantics: last write wins, no versioning.

use std::collections::HashMap;

use async_trait::async_trait;
use batoners_core::achievement::{merge_achievements, Achievement};
use batoners_core::league::League;
use batoners_core::player::{LeaderboardEntry, Player, ProgressUpdate};
use tokio::sync::RwLock;

use crate::repositories::PlayerRepo;
use crate::DbPool;

/// Errors from a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Document-per-player storage operations.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Fetch the player with this id, creating a fresh profile if absent.
    async fn get_or_create(&self, telegram_id: &str, username: &str)
        -> Result<Player, StoreError>;

    async fn find(&self, telegram_id: &str) -> Result<Option<Player>, StoreError>;

    /// Replace the fields present in `update`. `None` if the player is unknown.
    async fn save_progress(
        &self,
        telegram_id: &str,
        update: ProgressUpdate,
    ) -> Result<Option<Player>, StoreError>;

    /// Up to `limit` players of `league`, ordered by balance descending.
    async fn leaderboard(
        &self,
        league: League,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Merge achievements by id. `None` if the player is unknown.
    async fn merge_achievements(
        &self,
        telegram_id: &str,
        incoming: Vec<Achievement>,
    ) -> Result<Option<Vec<Achievement>>, StoreError>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// [`PlayerStore`] backed by the `players` table.
pub struct PgPlayerStore {
    pool: DbPool,
}

impl PgPlayerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl PlayerStore for PgPlayerStore {
    async fn get_or_create(
        &self,
        telegram_id: &str,
        username: &str,
    ) -> Result<Player, StoreError> {
        Ok(PlayerRepo::get_or_create(&self.pool, telegram_id, username).await?)
    }

    async fn find(&self, telegram_id: &str) -> Result<Option<Player>, StoreError> {
        Ok(PlayerRepo::find_by_telegram_id(&self.pool, telegram_id).await?)
    }

    async fn save_progress(
        &self,
        telegram_id: &str,
        update: ProgressUpdate,
    ) -> Result<Option<Player>, StoreError> {
        Ok(PlayerRepo::update_progress(&self.pool, telegram_id, &update).await?)
    }

    async fn leaderboard(
        &self,
        league: League,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(PlayerRepo::leaderboard(&self.pool, league, limit).await?)
    }

    async fn merge_achievements(
        &self,
        telegram_id: &str,
        incoming: Vec<Achievement>,
    ) -> Result<Option<Vec<Achievement>>, StoreError> {
        Ok(PlayerRepo::merge_achievements(&self.pool, telegram_id, incoming).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// [`PlayerStore`] holding every document in a process-local map.
///
/// Thread-safe via interior `RwLock`; contents are lost on restart.
#[derive(Default)]
pub struct MemoryPlayerStore {
    players: RwLock<HashMap<String, Player>>,
}

impl MemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a whole document.
    pub async fn insert(&self, player: Player) {
        self.players
            .write()
            .await
            .insert(player.telegram_id.clone(), player);
    }

    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }
}

#[async_trait]
impl PlayerStore for MemoryPlayerStore {
    async fn get_or_create(
        &self,
        telegram_id: &str,
        username: &str,
    ) -> Result<Player, StoreError> {
        let mut players = self.players.write().await;
        let player = players.entry(telegram_id.to_string()).or_insert_with(|| {
            tracing::info!(telegram_id, "Created player profile");
            Player::new(telegram_id, username, chrono::Utc::now())
        });
        Ok(player.clone())
    }

    async fn find(&self, telegram_id: &str) -> Result<Option<Player>, StoreError> {
        Ok(self.players.read().await.get(telegram_id).cloned())
    }

    async fn save_progress(
        &self,
        telegram_id: &str,
        update: ProgressUpdate,
    ) -> Result<Option<Player>, StoreError> {
        let mut players = self.players.write().await;
        Ok(players.get_mut(telegram_id).map(|player| {
            player.apply_update(update, chrono::Utc::now());
            player.clone()
        }))
    }

    async fn leaderboard(
        &self,
        league: League,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let players = self.players.read().await;
        let mut entries: Vec<LeaderboardEntry> = players
            .values()
            .filter(|p| p.current_league == league)
            .map(Player::leaderboard_entry)
            .collect();
        entries.sort_by(|a, b| b.batons.total_cmp(&a.batons));
        entries.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(entries)
    }

    async fn merge_achievements(
        &self,
        telegram_id: &str,
        incoming: Vec<Achievement>,
    ) -> Result<Option<Vec<Achievement>>, StoreError> {
        let mut players = self.players.write().await;
        Ok(players.get_mut(telegram_id).map(|player| {
            let now = chrono::Utc::now();
            merge_achievements(&mut player.achievements, incoming, now);
            player.last_active = now;
            player.achievements.clone()
        }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
