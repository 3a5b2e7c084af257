use std::sync::Arc;

use batoners_db::store::PlayerStore;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Constructed once at startup and torn down with the server. This is
/// cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Player document storage.
    pub store: Arc<dyn PlayerStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Request counters for protected routes.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(store: Arc<dyn PlayerStore>, config: ServerConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        Self {
            store,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}
