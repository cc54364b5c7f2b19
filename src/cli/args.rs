//! CLI argument definitions using clap
//!
//! Commands:
//! - strata canonicalize <path>
//! - strata cache-size --config <path>
//! - strata status --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// strata - storage-engine integration layer
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Write configuration detail at TRACE
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the canonical form of an indexed field path
    Canonicalize {
        /// Dotted field path
        path: String,
    },

    /// Print the cache size the environment would be opened with
    CacheSize {
        /// Path to configuration file
        #[arg(long, default_value = "./strata.json")]
        config: PathBuf,
    },

    /// Open the environment, print its engine status and shut down
    Status {
        /// Path to configuration file
        #[arg(long, default_value = "./strata.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
