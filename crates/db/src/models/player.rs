//! Row mapping for the `players` table.

use batoners_core::achievement::Achievement;
use batoners_core::card::OwnedCard;
use batoners_core::league::League;
use batoners_core::player::{LeaderboardEntry, Player};
use batoners_core::skin::Skin;
use batoners_core::types::Timestamp;
use sqlx::types::Json;
use sqlx::FromRow;

/// Full row from the `players` table. Collections are JSONB columns.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    pub telegram_id: String,
    pub username: String,
    pub batons: f64,
    pub batons_per_click: f64,
    pub passive_income: f64,
    pub current_league: String,
    pub current_skin: String,
    pub cards: Json<Vec<OwnedCard>>,
    pub skins: Json<Vec<Skin>>,
    pub achievements: Json<Vec<Achievement>>,
    pub last_active: Timestamp,
    pub created_at: Timestamp,
}

/// Projection used by the leaderboard query.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub username: String,
    pub batons: f64,
    pub current_league: String,
}

/// Parse a stored league name, falling back to the default tier for
/// values written by an older schema.
fn parse_league(raw: &str, telegram_id: Option<&str>) -> League {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(league = raw, telegram_id, "Unknown league in players row");
        League::default()
    })
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        let current_league = parse_league(&row.current_league, Some(&row.telegram_id));
        Player {
            telegram_id: row.telegram_id,
            username: row.username,
            batons: row.batons,
            batons_per_click: row.batons_per_click,
            passive_income: row.passive_income,
            current_league,
            current_skin: row.current_skin,
            cards: row.cards.0,
            skins: row.skins.0,
            achievements: row.achievements.0,
            last_active: row.last_active,
            created_at: row.created_at,
        }
    }
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        LeaderboardEntry {
            current_league: parse_league(&row.current_league, None),
            username: row.username,
            batons: row.batons,
        }
    }
}
