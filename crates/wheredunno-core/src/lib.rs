//! # wheredunno-core
//!
//! Core types, traits, configuration, and error handling for the wheredunno chat room.

pub mod config;
pub mod context;
pub mod error;
pub mod fact;
pub mod message;
pub mod traits;

pub use config::shellexpand;
