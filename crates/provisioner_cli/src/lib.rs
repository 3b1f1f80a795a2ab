//! Repository provisioner CLI library exports.
//!
//! The binary in `main.rs` only parses arguments and installs logging; every
//! command lives here so it can be tested without spawning a process.

pub mod commands;
pub mod errors;
