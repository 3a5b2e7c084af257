//! Domain types and pure game logic shared by the persistence service and
//! the game client.
//!
//! Nothing in this crate performs I/O. Clocks are passed in as epoch
//! milliseconds or [`types::Timestamp`] values so every rule can be tested
//! deterministically.

pub mod achievement;
pub mod card;
pub mod catalog;
pub mod error;
pub mod league;
pub mod player;
pub mod skin;
pub mod types;
pub mod validation;
