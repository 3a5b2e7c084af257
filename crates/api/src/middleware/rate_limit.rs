//! Sliding-window rate limiting for protected routes.
//!
//! Each client key keeps the timestamps of its requests inside the current
//! window. A request is rejected with 429 once the key already has
//! `max_requests` hits younger than `window`. Keys are the authenticated
//! Telegram id when a valid token is present, otherwise the client IP.
//! `x-forwarded-for` is only read when the service is configured to trust
//! it; otherwise any client could pick a fresh key per request.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use batoners_core::error::CoreError;

use crate::error::AppError;
use crate::middleware::auth::optional_telegram_id;
use crate::state::AppState;

/// Default requests allowed per window.
pub const DEFAULT_MAX_REQUESTS: usize = 100;
/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Rate limit settings.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
    /// Key anonymous clients by the first `x-forwarded-for` entry. Enable
    /// only behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            trust_forwarded_for: false,
        }
    }
}

impl RateLimitConfig {
    /// Load from `RATE_LIMIT_MAX_REQUESTS`, `RATE_LIMIT_WINDOW_SECS` and
    /// `RATE_LIMIT_TRUST_FORWARDED_FOR`.
    pub fn from_env() -> Self {
        let max_requests: usize = std::env::var("RATE_LIMIT_MAX_REQUESTS")
            .unwrap_or_else(|_| DEFAULT_MAX_REQUESTS.to_string())
            .parse()
            .expect("RATE_LIMIT_MAX_REQUESTS must be a valid usize");

        let window_secs: u64 = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| DEFAULT_WINDOW_SECS.to_string())
            .parse()
            .expect("RATE_LIMIT_WINDOW_SECS must be a valid u64");

        let trust_forwarded_for: bool = std::env::var("RATE_LIMIT_TRUST_FORWARDED_FOR")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .expect("RATE_LIMIT_TRUST_FORWARDED_FOR must be true or false");

        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            trust_forwarded_for,
        }
    }
}

/// In-memory request counters, owned by [`AppState`].
pub struct RateLimiter {
    config: RateLimitConfig,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record a request for `key` now. Returns `false` if it must be rejected.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Record a request for `key` at `now`. Rejected requests are not recorded.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let window = hits.entry(key.to_string()).or_default();
        evict_expired(window, now, self.config.window);

        if window.len() >= self.config.max_requests {
            return false;
        }
        window.push_back(now);
        true
    }

    /// Drop keys with no requests inside the window. Returns how many were removed.
    pub fn purge_idle(&self, now: Instant) -> usize {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let before = hits.len();
        hits.retain(|_, window| {
            evict_expired(window, now, self.config.window);
            !window.is_empty()
        });
        before - hits.len()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn evict_expired(window: &mut VecDeque<Instant>, now: Instant, length: Duration) {
    while let Some(&oldest) = window.front() {
        if now.duration_since(oldest) >= length {
            window.pop_front();
        } else {
            break;
        }
    }
}

/// Axum middleware enforcing [`RateLimiter`] on the wrapped routes.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request, &state);
    if !state.rate_limiter.check(&key) {
        tracing::warn!(key = %key, "Rate limit exceeded");
        return Err(AppError::Core(CoreError::RateLimited(
            "Too many requests. Please wait.".into(),
        )));
    }
    Ok(next.run(request).await)
}

/// Key a request by player id, falling back to the client address.
fn client_key(request: &Request, state: &AppState) -> String {
    if let Some(telegram_id) = optional_telegram_id(request.headers(), &state.config.jwt) {
        return format!("player:{telegram_id}");
    }

    if state.rate_limiter.config().trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return format!("ip:{ip}");
        }
    }

    match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("ip:{}", addr.ip()),
        None => "ip:unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
            trust_forwarded_for: false,
        })
    }

    #[test]
    fn allows_up_to_the_limit() {
        let limiter = limiter(3, 60);
        let now = Instant::now();
        assert!(limiter.check_at("k", now));
        assert!(limiter.check_at("k", now));
        assert!(limiter.check_at("k", now));
        assert!(!limiter.check_at("k", now));
    }

    #[test]
    fn window_slides() {
        let limiter = limiter(2, 60);
        let start = Instant::now();
        assert!(limiter.check_at("k", start));
        assert!(limiter.check_at("k", start + Duration::from_secs(30)));
        assert!(!limiter.check_at("k", start + Duration::from_secs(59)));
        // The first hit leaves the window at 60s.
        assert!(limiter.check_at("k", start + Duration::from_secs(60)));
        assert!(!limiter.check_at("k", start + Duration::from_secs(61)));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check_at("a", now));
        assert!(!limiter.check_at("a", now));
        assert!(limiter.check_at("b", now));
    }

    #[test]
    fn rejected_requests_are_not_counted() {
        let limiter = limiter(1, 10);
        let start = Instant::now();
        assert!(limiter.check_at("k", start));
        for s in 1..10 {
            assert!(!limiter.check_at("k", start + Duration::from_secs(s)));
        }
        assert!(limiter.check_at("k", start + Duration::from_secs(10)));
    }

    #[test]
    fn purge_drops_idle_keys() {
        let limiter = limiter(5, 60);
        let start = Instant::now();
        limiter.check_at("old", start);
        limiter.check_at("fresh", start + Duration::from_secs(50));

        let removed = limiter.purge_idle(start + Duration::from_secs(70));
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
