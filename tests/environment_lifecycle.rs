//! Environment lifecycle tests
//!
//! Startup reads the configuration file, derives the cache size, configures
//! and opens the engine. Status is reported as a flat map. Transitions happen
//! once.

use std::io::Write;

use strata::config::StorageConfig;
use strata::engine::memory::TxnStats;
use strata::engine::{MemoryEngine, StatusRow, StatusValue};
use strata::env::{EnvState, Environment, FilesystemStatus, FixedProbe, StatusField};
use strata::errors::{status, ErrorCode, OutcomeKind};
use tempfile::{NamedTempFile, TempDir};

// =============================================================================
// Test Utilities
// =============================================================================

fn probe(physical: u64, max_data: Option<u64>) -> Box<FixedProbe> {
    Box::new(FixedProbe {
        physical: Some(physical),
        max_data,
    })
}

fn started(engine: &MemoryEngine, config: StorageConfig) -> Environment<MemoryEngine> {
    let mut env = Environment::with_probe(engine.clone(), config, probe(16 << 30, None));
    env.startup().unwrap();
    env
}

// =============================================================================
// Startup
// =============================================================================

#[test]
fn test_startup_from_config_file() {
    let dir = TempDir::new().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "data_dir": {:?},
            "cache_size": 1610612736,
            "lock_timeout_ms": 9000,
            "cleaner_period_secs": 4,
            "cleaner_iterations": 9
        }}"#,
        dir.path().display().to_string()
    )
    .unwrap();

    let config = StorageConfig::load(file.path()).unwrap();
    let engine = MemoryEngine::new();
    let env = started(&engine, config);

    let seen = engine.config();
    assert_eq!((seen.cache_gigabytes, seen.cache_bytes), (1, 1 << 29));
    assert_eq!(seen.lock_max_memory, 1610612736 / 10);
    assert_eq!(seen.lock_timeout_ms, 9000);
    assert_eq!(seen.cleaner_period_secs, 4);
    assert_eq!(seen.cleaner_iterations, 9);
    assert_eq!(seen.dir.as_deref(), Some(dir.path()));
    assert_eq!(env.state(), EnvState::Open);
}

#[test]
fn test_derived_cache_size_respects_data_limit() {
    let dir = TempDir::new().unwrap();
    let engine = MemoryEngine::new();
    let mut env = Environment::with_probe(
        engine.clone(),
        StorageConfig::new(dir.path()),
        probe(16 << 30, Some(8 << 30)),
    );
    env.startup().unwrap();

    assert_eq!(env.cache_size(), Some(1 << 30));
    assert_eq!(engine.config().cache_size(), 1 << 30);
}

#[test]
fn test_direct_io_is_passed_through() {
    let dir = TempDir::new().unwrap();
    let engine = MemoryEngine::new();
    let mut config = StorageConfig::new(dir.path());
    config.direct_io = true;
    let _env = started(&engine, config);
    assert!(engine.config().direct_io);
}

// =============================================================================
// Status
// =============================================================================

#[test]
fn test_status_report_fields() {
    let dir = TempDir::new().unwrap();
    let engine = MemoryEngine::new();
    let env = started(&engine, StorageConfig::new(dir.path()));
    env.checkpoint().unwrap();

    let report = env.get_status().unwrap();
    assert_eq!(report.panic_code, 0);
    assert_eq!(report.filesystem, FilesystemStatus::Ok);
    assert_eq!(report.get("checkpoint: checkpoints taken"), Some(&StatusField::Integer(1)));
    assert_eq!(report.get("engine: backend"), Some(&StatusField::Text("memory".into())));
    assert!(matches!(report.get("checkpoint: time spent"), Some(StatusField::Seconds(_))));
    match report.get("checkpoint: last checkpoint began") {
        Some(StatusField::Text(t)) => assert!(t.contains('T'), "{}", t),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_status_json_order_and_panic() {
    let dir = TempDir::new().unwrap();
    let engine = MemoryEngine::new();
    let env = started(&engine, StorageConfig::new(dir.path()));
    engine.set_redzone_state(2);
    engine.set_panic(7, "disk on fire");
    engine.push_status_row(StatusRow::new(
        "txn: per-thread",
        "txn: per-thread counter",
        StatusValue::Counter(vec![1, 2, 3]),
    ));

    let json = serde_json::to_value(env.get_status().unwrap()).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys[0], "panic code");
    assert_eq!(keys[1], "panic string");
    assert_eq!(keys[2], "filesystem status");
    assert_eq!(json["panic code"], 7);
    assert_eq!(json["panic string"], "disk on fire");
    assert_eq!(
        json["filesystem status"],
        "Critically full. Engine is read-only until space is freed."
    );
    assert_eq!(json["txn: per-thread"], 6);
}

#[test]
fn test_unknown_filesystem_state() {
    assert_eq!(FilesystemStatus::from_raw(9).to_string(), "Unknown. Code: 9");
}

#[test]
fn test_status_failure_is_returned_not_fatal() {
    let dir = TempDir::new().unwrap();
    let engine = MemoryEngine::new();
    let env = started(&engine, StorageConfig::new(dir.path()));
    engine.inject_fault("status_row_count", status::BAD_FORMAT);

    let err = env.get_status().unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadFormat);
    assert_eq!(err.kind(), OutcomeKind::FatalCorruption);

    engine.clear_fault("status_row_count");
    assert!(env.get_status().is_ok());
}

// =============================================================================
// Shutdown
// =============================================================================

#[test]
fn test_shutdown_closes_engine() {
    let dir = TempDir::new().unwrap();
    let engine = MemoryEngine::new();
    let mut env = started(&engine, StorageConfig::new(dir.path()));
    assert!(engine.is_open());

    env.shutdown().unwrap();
    assert!(!engine.is_open());
    assert_eq!(env.state(), EnvState::Closed);
    assert_eq!(env.checkpoint().unwrap_err().code(), ErrorCode::EnvNotOpen);
    assert_eq!(engine.txn_stats(), TxnStats::default());
}

#[test]
fn test_lifecycle_errors_are_returned() {
    let dir = TempDir::new().unwrap();
    let engine = MemoryEngine::new();
    let mut env = started(&engine, StorageConfig::new(dir.path()));
    let err = env.startup().unwrap_err();
    assert_eq!(err.code(), ErrorCode::EnvLifecycle);
    assert!(env.is_open());
}
