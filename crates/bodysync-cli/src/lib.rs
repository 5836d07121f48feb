//! Command-line interface for body-composition measurement sync.
//!
//! Exposed as a library so integration tests can drive the command
//! implementations directly; the `bodysync` binary in `main.rs` is a thin
//! wrapper around these modules.

pub mod cli;
pub mod commands;
pub mod config;
pub mod source;
pub mod util;
