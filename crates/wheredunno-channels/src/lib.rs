//! # wheredunno-channels
//!
//! The shared chat room that every message passes through.

pub mod room;

pub use room::Room;
