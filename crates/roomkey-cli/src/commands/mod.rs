//! CLI command implementations for roomkey tooling.

pub mod secret;
pub mod token;
