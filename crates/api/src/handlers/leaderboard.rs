//! Handler for the public leaderboard.

use axum::extract::{Query, State};
use axum::Json;
use batoners_core::league::League;
use batoners_core::player::LeaderboardEntry;
use batoners_core::validation::clamp_leaderboard_limit;

use crate::error::AppResult;
use crate::query::LeaderboardParams;
use crate::state::AppState;

/// GET /api/leaderboard?league=bronze&limit=100
///
/// Players of one league ordered by balance, highest first.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
    let league = match params.league.as_deref() {
        Some(raw) => raw.parse::<League>()?,
        None => League::default(),
    };
    let limit = clamp_leaderboard_limit(params.limit);

    let entries = state.store.leaderboard(league, limit).await?;
    Ok(Json(entries))
}
