//! Request extractors and middleware.
//!
//! - [`auth::AuthPlayer`] -- Extracts the authenticated player from a Bearer token.
//! - [`rate_limit::RateLimiter`] -- Sliding-window request limiter for protected routes.

pub mod auth;
pub mod rate_limit;
