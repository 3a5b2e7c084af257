//! Database row structs and their conversion into domain documents.

pub mod player;
