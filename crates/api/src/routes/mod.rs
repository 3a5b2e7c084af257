pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod player;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /login              POST  get-or-create + token (public)
/// /leaderboard        GET   league ranking (public)
///
/// /profile            GET   own document (auth, rate limited)
/// /save-progress      POST  replace progress fields (auth, rate limited)
/// /achievements       POST  merge achievements (auth, rate limited)
/// ```
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(leaderboard::router())
        .merge(player::router(state))
}
