//! Client-side game state for Batoners.
//!
//! - [`store::ProgressStore`] -- the session's single source of truth.
//! - [`accrual`] -- once-per-second passive income collection.
//! - [`sync`] -- debounced push and periodic pull against the service.
//! - [`api`] -- the service seam and its reqwest implementation.
//! - [`local`] -- durable local snapshot storage.
//! - [`session::GameSession`] -- owns the store and every background task.

pub mod accrual;
pub mod api;
pub mod config;
pub mod error;
pub mod local;
pub mod session;
pub mod store;
pub mod sync;
