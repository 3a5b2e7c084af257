#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use batoners_api::auth::jwt::JwtConfig;
use batoners_api::config::ServerConfig;
use batoners_api::middleware::rate_limit::RateLimitConfig;
use batoners_api::router::build_app_router;
use batoners_api::state::AppState;
use batoners_db::store::MemoryPlayerStore;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            token_expiry_days: 30,
        },
        rate_limit: RateLimitConfig::default(),
    }
}

/// Full application router over a fresh in-memory store.
///
/// Returns the store too so tests can seed or inspect documents directly.
pub fn build_test_app() -> (Router, Arc<MemoryPlayerStore>) {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> (Router, Arc<MemoryPlayerStore>) {
    let store = Arc::new(MemoryPlayerStore::new());
    let state = AppState::new(store.clone(), config);
    (build_app_router(state), store)
}

/// Config whose limiter allows `max_requests` per minute.
pub fn config_with_rate_limit(max_requests: usize) -> ServerConfig {
    ServerConfig {
        rate_limit: RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
            trust_forwarded_for: false,
        },
        ..test_config()
    }
}

/// Like [`config_with_rate_limit`], keyed by `x-forwarded-for` for anonymous clients.
pub fn config_trusting_forwarded_for(max_requests: usize) -> ServerConfig {
    let mut config = config_with_rate_limit(max_requests);
    config.rate_limit.trust_forwarded_for = true;
    config
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_forwarded(app: Router, uri: &str, forwarded_for: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-forwarded-for", forwarded_for)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in through the API and return `(token, user)`.
pub async fn login(app: Router, telegram_id: &str, username: &str) -> (String, serde_json::Value) {
    let body = serde_json::json!({ "telegramId": telegram_id, "username": username });
    let response = post_json(app, "/api/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let token = json["token"].as_str().expect("token").to_string();
    (token, json["user"].clone())
}
