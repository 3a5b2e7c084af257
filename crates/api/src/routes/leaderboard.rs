use axum::routing::get;
use axum::Router;

use crate::handlers::leaderboard;
use crate::state::AppState;

/// ```text
/// GET /leaderboard -> leaderboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/leaderboard", get(leaderboard::leaderboard))
}
