//! Handlers for the authenticated player's own document.

use axum::extract::State;
use axum::Json;
use batoners_core::achievement::Achievement;
use batoners_core::error::CoreError;
use batoners_core::player::{Player, ProgressUpdate};
use batoners_core::validation::validate_progress_update;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthPlayer;
use crate::state::AppState;

/// Request body for `POST /api/achievements`.
#[derive(Debug, Deserialize)]
pub struct AchievementsRequest {
    pub achievements: Vec<Achievement>,
}

fn player_not_found(telegram_id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Player",
        id: telegram_id.to_string(),
    })
}

/// GET /api/profile
pub async fn profile(State(state): State<AppState>, auth: AuthPlayer) -> AppResult<Json<Player>> {
    let player = state
        .store
        .find(&auth.telegram_id)
        .await?
        .ok_or_else(|| player_not_found(&auth.telegram_id))?;
    Ok(Json(player))
}

/// POST /api/save-progress
///
/// Replaces every field present in the body; absent fields keep their
/// stored value. Last write wins.
pub async fn save_progress(
    State(state): State<AppState>,
    auth: AuthPlayer,
    Json(update): Json<ProgressUpdate>,
) -> AppResult<Json<Player>> {
    validate_progress_update(&update)?;

    let player = state
        .store
        .save_progress(&auth.telegram_id, update)
        .await?
        .ok_or_else(|| player_not_found(&auth.telegram_id))?;

    tracing::debug!(telegram_id = %auth.telegram_id, batons = player.batons, "Progress saved");
    Ok(Json(player))
}

/// POST /api/achievements
///
/// Merges the submitted list into the stored one by id and returns the
/// merged list.
pub async fn update_achievements(
    State(state): State<AppState>,
    auth: AuthPlayer,
    Json(input): Json<AchievementsRequest>,
) -> AppResult<Json<Vec<Achievement>>> {
    let achievements = state
        .store
        .merge_achievements(&auth.telegram_id, input.achievements)
        .await?
        .ok_or_else(|| player_not_found(&auth.telegram_id))?;
    Ok(Json(achievements))
}
