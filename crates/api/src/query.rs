//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Leaderboard query (`?league=&limit=`).
///
/// `league` defaults to bronze and `limit` to 100; the limit is clamped in
/// [`batoners_core::validation::clamp_leaderboard_limit`].
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub league: Option<String>,
    pub limit: Option<i64>,
}
