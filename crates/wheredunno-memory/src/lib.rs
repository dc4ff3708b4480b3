//! # wheredunno-memory
//!
//! Persistent storage for wheredunno (SQLite-backed): the room's message log
//! and the last known whereabout of every user.

pub mod store;

pub use store::Store;
