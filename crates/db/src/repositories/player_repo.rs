//! Repository for the `players` table.

use batoners_core::achievement::{merge_achievements, Achievement};
use batoners_core::league::League;
use batoners_core::player::{LeaderboardEntry, Player, ProgressUpdate};
use batoners_core::skin::starter_skins;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::player::{LeaderboardRow, PlayerRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "telegram_id, username, batons, batons_per_click, passive_income, \
                       current_league, current_skin, cards, skins, achievements, \
                       last_active, created_at";

/// Provides document-style operations on player rows.
pub struct PlayerRepo;

impl PlayerRepo {
    /// Find a player by Telegram id.
    pub async fn find_by_telegram_id(
        pool: &PgPool,
        telegram_id: &str,
    ) -> Result<Option<Player>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM players WHERE telegram_id = $1");
        let row = sqlx::query_as::<_, PlayerRow>(&query)
            .bind(telegram_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Player::from))
    }

    /// Return the existing player or insert a fresh profile.
    ///
    /// The insert is idempotent under concurrent logins for the same id:
    /// a conflicting insert is ignored and the surviving row is returned.
    pub async fn get_or_create(
        pool: &PgPool,
        telegram_id: &str,
        username: &str,
    ) -> Result<Player, sqlx::Error> {
        let inserted = sqlx::query(
            "INSERT INTO players (telegram_id, username, skins)
             VALUES ($1, $2, $3)
             ON CONFLICT (telegram_id) DO NOTHING",
        )
        .bind(telegram_id)
        .bind(username)
        .bind(Json(starter_skins()))
        .execute(pool)
        .await?;

        if inserted.rows_affected() > 0 {
            tracing::info!(telegram_id, "Created player profile");
        }

        Self::find_by_telegram_id(pool, telegram_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Replace the fields present in `input` and touch `last_active`.
    ///
    /// Returns `None` if no row with the given id exists.
    pub async fn update_progress(
        pool: &PgPool,
        telegram_id: &str,
        input: &ProgressUpdate,
    ) -> Result<Option<Player>, sqlx::Error> {
        let query = format!(
            "UPDATE players SET
                username = COALESCE($2, username),
                batons = COALESCE($3, batons),
                batons_per_click = COALESCE($4, batons_per_click),
                passive_income = COALESCE($5, passive_income),
                current_league = COALESCE($6, current_league),
                current_skin = COALESCE($7, current_skin),
                cards = COALESCE($8, cards),
                skins = COALESCE($9, skins),
                last_active = NOW()
             WHERE telegram_id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PlayerRow>(&query)
            .bind(telegram_id)
            .bind(&input.username)
            .bind(input.batons)
            .bind(input.batons_per_click)
            .bind(input.passive_income)
            .bind(input.current_league.map(League::as_str))
            .bind(&input.current_skin)
            .bind(input.cards.as_ref().map(Json))
            .bind(input.skins.as_ref().map(Json))
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Player::from))
    }

    /// Top players of a league by balance, highest first.
    pub async fn leaderboard(
        pool: &PgPool,
        league: League,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT username, batons, current_league
             FROM players
             WHERE current_league = $1
             ORDER BY batons DESC
             LIMIT $2",
        )
        .bind(league.as_str())
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(LeaderboardEntry::from).collect())
    }

    /// Merge `incoming` into the stored achievement list inside a
    /// transaction that holds the row lock.
    ///
    /// Returns the merged list, or `None` if the player does not exist.
    pub async fn merge_achievements(
        pool: &PgPool,
        telegram_id: &str,
        incoming: Vec<Achievement>,
    ) -> Result<Option<Vec<Achievement>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let stored: Option<(Json<Vec<Achievement>>,)> = sqlx::query_as(
            "SELECT achievements FROM players WHERE telegram_id = $1 FOR UPDATE",
        )
        .bind(telegram_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((Json(mut achievements),)) = stored else {
            return Ok(None);
        };

        merge_achievements(&mut achievements, incoming, chrono::Utc::now());

        sqlx::query(
            "UPDATE players SET achievements = $2, last_active = NOW() WHERE telegram_id = $1",
        )
        .bind(telegram_id)
        .bind(Json(&achievements))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(achievements))
    }
}
