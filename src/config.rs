//! Storage configuration
//!
//! Loaded from a JSON file. Every field except `data_dir` has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Environment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Environment directory (required)
    pub data_dir: PathBuf,

    /// Open files with direct I/O
    #[serde(default)]
    pub direct_io: bool,

    /// Cache size in bytes; 0 derives it from physical memory
    #[serde(default)]
    pub cache_size: u64,

    /// Row lock wait timeout
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Interval between recovery log fsyncs
    #[serde(default = "default_log_flush_period_ms")]
    pub log_flush_period_ms: u32,

    #[serde(default = "default_checkpoint_period_secs")]
    pub checkpoint_period_secs: u32,

    #[serde(default = "default_cleaner_period_secs")]
    pub cleaner_period_secs: u32,

    #[serde(default = "default_cleaner_iterations")]
    pub cleaner_iterations: u32,

    /// Free-space percentage below which the engine restricts writes
    #[serde(default = "default_fs_redzone_percent")]
    pub fs_redzone_percent: u32,
}

fn default_lock_timeout_ms() -> u64 {
    4000
}
fn default_log_flush_period_ms() -> u32 {
    100
}
fn default_checkpoint_period_secs() -> u32 {
    60
}
fn default_cleaner_period_secs() -> u32 {
    2
}
fn default_cleaner_iterations() -> u32 {
    5
}
fn default_fs_redzone_percent() -> u32 {
    5
}

impl StorageConfig {
    /// Defaults for everything but the data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            direct_io: false,
            cache_size: 0,
            lock_timeout_ms: default_lock_timeout_ms(),
            log_flush_period_ms: default_log_flush_period_ms(),
            checkpoint_period_secs: default_checkpoint_period_secs(),
            cleaner_period_secs: default_cleaner_period_secs(),
            cleaner_iterations: default_cleaner_iterations(),
            fs_redzone_percent: default_fs_redzone_percent(),
        }
    }

    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: StorageConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }
        if self.fs_redzone_percent > 100 {
            return Err(ConfigError::Invalid(format!(
                "fs_redzone_percent must be at most 100, got {}",
                self.fs_redzone_percent
            )));
        }
        if self.checkpoint_period_secs == 0 {
            return Err(ConfigError::Invalid("checkpoint_period_secs must be > 0".into()));
        }
        Ok(())
    }
}
