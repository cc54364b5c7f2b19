//! CLI command implementations
//!
//! Every command writes one JSON object to stdout.

use std::io::{self, Write};
use std::path::Path;

use serde_json::json;

use crate::config::StorageConfig;
use crate::engine::MemoryEngine;
use crate::env::{lock_memory_for, resolve_cache_size, split_cache_size, Environment, MemoryProbe, SystemProbe};
use crate::index_paths::canonicalize as canonicalize_path;
use crate::observability::{Logger, Severity};

use super::args::Command;
use super::errors::CliResult;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Canonicalize { path } => canonicalize(&path),
        Command::CacheSize { config } => cache_size(&config),
        Command::Status { config } => status(&config),
    }
}

/// Print the canonical form of `path` and whether it was rewritten
pub fn canonicalize(path: &str) -> CliResult<()> {
    write_json(&canonical_report(path))
}

/// Print the cache size an environment over `config_path` would use
pub fn cache_size(config_path: &Path) -> CliResult<()> {
    let config = StorageConfig::load(config_path)?;
    write_json(&cache_report(&config, &SystemProbe)?)
}

/// Open an environment over the in-memory engine, print its status and
/// shut it down.
pub fn status(config_path: &Path) -> CliResult<()> {
    let config = StorageConfig::load(config_path)?;
    let mut env = Environment::new(MemoryEngine::new(), config);
    env.startup()?;
    let report = env.get_status();
    env.shutdown()?;
    write_json(&serde_json::to_value(report?)?)
}

fn canonical_report(path: &str) -> serde_json::Value {
    let (canonical, rewritten) = canonicalize_path(path);
    json!({
        "path": path,
        "canonical": canonical,
        "rewritten": rewritten,
    })
}

fn cache_report(config: &StorageConfig, probe: &dyn MemoryProbe) -> CliResult<serde_json::Value> {
    let size = resolve_cache_size(config.cache_size, probe)?;
    let split = split_cache_size(size);
    Ok(json!({
        "cache_size": size,
        "gigabytes": split.gigabytes,
        "bytes": split.bytes,
        "lock_memory": lock_memory_for(size),
    }))
}

fn write_json(value: &serde_json::Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedProbe;
    use std::io::Write as _;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_canonical_report() {
        let report = canonical_report("a.$.b");
        assert_eq!(report["canonical"], "a.b");
        assert_eq!(report["rewritten"], true);

        let report = canonical_report("a.b");
        assert_eq!(report["canonical"], "a.b");
        assert_eq!(report["rewritten"], false);
    }

    #[test]
    fn test_cache_report_configured() {
        let mut config = StorageConfig::new("/tmp");
        config.cache_size = (3 << 30) + 512;
        let probe = FixedProbe {
            physical: Some(16 << 30),
            max_data: None,
        };
        let report = cache_report(&config, &probe).unwrap();
        assert_eq!(report["gigabytes"], 3);
        assert_eq!(report["bytes"], 512);
        assert_eq!(report["lock_memory"], ((3u64 << 30) + 512) / 10);
    }

    #[test]
    fn test_cache_report_unknown_memory() {
        let config = StorageConfig::new("/tmp");
        let probe = FixedProbe {
            physical: None,
            max_data: None,
        };
        assert!(cache_report(&config, &probe).is_err());
    }

    #[test]
    fn test_status_command_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        let config = json!({ "data_dir": dir.path(), "cache_size": 1u64 << 30 });
        write!(file, "{}", config).unwrap();

        status(file.path()).unwrap();
    }

    #[test]
    fn test_missing_config_is_config_error() {
        let err = status(Path::new("/nonexistent/strata.json")).unwrap_err();
        assert_eq!(err.code(), &crate::cli::CliErrorCode::ConfigError);
    }
}
