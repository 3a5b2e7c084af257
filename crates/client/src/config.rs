use std::path::PathBuf;
use std::time::Duration;

/// Default service base URL (routes are appended to it).
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Client configuration. Timing defaults mirror the game's fixed cadences.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL including the `/api` prefix.
    pub api_url: String,
    /// Where the local progress snapshot lives. `None` disables it.
    pub snapshot_path: Option<PathBuf>,
    /// Passive income tick (default: 1s).
    pub accrual_interval: Duration,
    /// Quiet period before a push is sent (default: 5s).
    pub push_debounce: Duration,
    /// Profile pull cadence (default: 30s).
    pub pull_interval: Duration,
    /// Per-request HTTP timeout (default: 10s).
    pub request_timeout: Duration,
    /// How long shutdown waits for background tasks (default: 5s).
    pub shutdown_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            snapshot_path: None,
            accrual_interval: Duration::from_secs(1),
            push_debounce: Duration::from_secs(5),
            pull_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                      |
    /// |--------------------------|------------------------------|
    /// | `BATONERS_API_URL`       | `http://localhost:3000/api`  |
    /// | `BATONERS_SNAPSHOT_PATH` | unset (no local snapshot)    |
    pub fn from_env() -> Self {
        let api_url = std::env::var("BATONERS_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_URL.into());

        let snapshot_path = std::env::var("BATONERS_SNAPSHOT_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Self {
            api_url,
            snapshot_path,
            ..Self::default()
        }
    }
}
