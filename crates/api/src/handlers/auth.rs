//! Handler for `POST /api/login`.

use axum::extract::State;
use axum::Json;
use batoners_core::player::Player;
use batoners_core::validation::validate_login;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/login`.
///
/// Missing fields deserialize as empty strings so they surface as a
/// validation error instead of a body rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub telegram_id: String,
    #[serde(default)]
    pub username: String,
}

/// Successful login: a session token plus the full player document.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Player,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/login
///
/// Get-or-create the player by Telegram id and issue a session token.
/// Idempotent: logging in again returns the stored profile unchanged.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_login(&input.telegram_id, &input.username)?;

    let telegram_id = input.telegram_id.trim();
    let user = state
        .store
        .get_or_create(telegram_id, input.username.trim())
        .await?;

    let token = generate_token(&user.telegram_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(telegram_id = %user.telegram_id, "Player logged in");

    Ok(Json(LoginResponse { token, user }))
}
