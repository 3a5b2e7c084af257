//! Route definitions for the authenticated player's document.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::player;
use crate::middleware::rate_limit::rate_limit;
use crate::state::AppState;

/// Protected routes. Every request passes the rate limiter before the
/// handler's [`AuthPlayer`](crate::middleware::auth::AuthPlayer) extractor runs.
///
/// ```text
/// GET  /profile        -> profile
/// POST /save-progress  -> save_progress
/// POST /achievements   -> update_achievements
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(player::profile))
        .route("/save-progress", post(player::save_progress))
        .route("/achievements", post(player::update_achievements))
        .route_layer(from_fn_with_state(state.clone(), rate_limit))
}
