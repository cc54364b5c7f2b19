//! CLI module for strata
//!
//! Provides command-line access to:
//! - canonicalize: indexed path canonical form
//! - cache-size: resolved cache size and its split
//! - status: engine status of a freshly opened environment

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{cache_size, canonicalize, run, run_command, status};
pub use errors::{CliError, CliErrorCode, CliResult};
