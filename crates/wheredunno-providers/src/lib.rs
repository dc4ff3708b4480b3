//! # wheredunno-providers
//!
//! Text-completion provider implementations for wheredunno.

pub mod gemini;
