//! Environment lifecycle
//!
//! ```text
//! Unopened --startup()--> Open --shutdown()--> Closed
//!     \___________________shutdown()_________/
//! ```
//!
//! Each transition happens once. Engine failures while configuring, opening
//! or closing the environment are fatal: a partially configured environment
//! never runs.

use std::fmt;

use crate::config::StorageConfig;
use crate::engine::{Engine, EngineEnv, OpenFlags, ENV_MODE};
use crate::errors::status::HUGE_PAGES_ENABLED;
use crate::errors::{classify, fatal, EngineResultExt, StoreError, StoreResult};
use crate::keys::compare_with_descriptor;
use crate::observability::{log_event_with_fields, trace_event, Event, Logger, ObservationScope};

use super::cache::{lock_memory_for, resolve_cache_size, split_cache_size, MemoryProbe, SystemProbe};
use super::status::StatusReport;

/// Prefix the engine puts on its diagnostics
pub const ERROR_PREFIX: &str = "strata";

const HUGE_PAGES_HINT: &str =
    "Huge pages are enabled, please disable them to continue (echo never > /sys/kernel/mm/transparent_hugepages/enabled)";

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    Unopened,
    Open,
    Closed,
}

impl fmt::Display for EnvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvState::Unopened => f.write_str("UNOPENED"),
            EnvState::Open => f.write_str("OPEN"),
            EnvState::Closed => f.write_str("CLOSED"),
        }
    }
}

enum Handle<T> {
    Unopened,
    Open(T),
    Closed,
}

/// The single open engine environment of the process
pub struct Environment<E: Engine> {
    engine: E,
    config: StorageConfig,
    probe: Box<dyn MemoryProbe>,
    handle: Handle<E::Env>,
    cache_size: Option<u64>,
}

impl<E: Engine> Environment<E> {
    pub fn new(engine: E, config: StorageConfig) -> Self {
        Self::with_probe(engine, config, Box::new(SystemProbe))
    }

    /// Use `probe` instead of the host's memory limits for cache sizing
    pub fn with_probe(engine: E, config: StorageConfig, probe: Box<dyn MemoryProbe>) -> Self {
        Self {
            engine,
            config,
            probe,
            handle: Handle::Unopened,
            cache_size: None,
        }
    }

    pub fn state(&self) -> EnvState {
        match self.handle {
            Handle::Unopened => EnvState::Unopened,
            Handle::Open(_) => EnvState::Open,
            Handle::Closed => EnvState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == EnvState::Open
    }

    /// Current configuration, including runtime changes
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Resolved cache size, once started
    pub fn cache_size(&self) -> Option<u64> {
        self.cache_size
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The open engine environment
    pub fn engine_env(&self, operation: &str) -> StoreResult<&E::Env> {
        match self.handle {
            Handle::Open(ref env) => Ok(env),
            _ => Err(StoreError::env_not_open(operation)),
        }
    }

    fn engine_env_mut(&mut self, operation: &str) -> StoreResult<&mut E::Env> {
        match self.handle {
            Handle::Open(ref mut env) => Ok(env),
            _ => Err(StoreError::env_not_open(operation)),
        }
    }

    /// Create, configure and open the engine environment.
    ///
    /// Returns an error only when called in the wrong state. Any engine
    /// failure terminates the process.
    ///
    /// Transparent huge pages are reported two ways. An advisory returned
    /// alongside a usable handle is logged as a warning and startup goes on.
    /// A creation failure carrying the same status has no handle to go on
    /// with, so it logs the remediation hint and is fatal.
    pub fn startup(&mut self) -> StoreResult<()> {
        if self.state() != EnvState::Unopened {
            return Err(StoreError::env_lifecycle(format!(
                "startup called in state {}",
                self.state()
            )));
        }
        let scope = ObservationScope::new("STORAGE_STARTUP");
        let config = &self.config;

        self.engine.set_direct_io(config.direct_io);

        let created = match self.engine.create_env() {
            Ok(created) => created,
            Err(status) => {
                if status.code() == HUGE_PAGES_ENABLED {
                    Logger::error(Event::HugePagesEnabled.as_str(), &[("remediation", HUGE_PAGES_HINT)]);
                }
                fatal::halt_on(&classify(status), "create_env")
            }
        };
        if let Some(advisory) = created.advisory {
            let status = advisory.to_string();
            if advisory.code() == HUGE_PAGES_ENABLED {
                Logger::warn(
                    Event::HugePagesEnabled.as_str(),
                    &[("remediation", HUGE_PAGES_HINT), ("status", status.as_str())],
                );
            } else {
                Logger::warn(Event::EngineDiagnostic.as_str(), &[("status", status.as_str())]);
            }
        }
        let mut env = created.env;

        env.set_error_callback(Box::new(|prefix: &str, message: &str| {
            Logger::error(
                Event::EngineDiagnostic.as_str(),
                &[("message", message), ("prefix", prefix)],
            );
        }));
        env.set_error_prefix(ERROR_PREFIX);

        let cache_size = resolve_cache_size(config.cache_size, self.probe.as_ref())
            .unwrap_or_else(|e| fatal::halt_on(&e, "resolve_cache_size"));
        let split = split_cache_size(cache_size);
        env.set_cache_size(split.gigabytes, split.bytes, 1).or_halt("set_cache_size");
        let gigabytes = split.gigabytes.to_string();
        let bytes = split.bytes.to_string();
        trace_event(Event::CacheSizeSet, &[("bytes", bytes.as_str()), ("gigabytes", gigabytes.as_str())]);

        let lock_memory = lock_memory_for(cache_size);
        env.set_lock_max_memory(lock_memory).or_halt("set_lock_max_memory");
        log_event_with_fields(Event::LockMemorySet, &[("bytes", lock_memory.to_string().as_str())]);

        env.set_lock_timeout(config.lock_timeout_ms).or_halt("set_lock_timeout");
        trace_event(Event::LockTimeoutSet, &[("ms", config.lock_timeout_ms.to_string().as_str())]);

        env.set_default_compare(compare_with_descriptor).or_halt("set_default_compare");

        env.change_fsync_log_period(config.log_flush_period_ms)
            .or_halt("change_fsync_log_period");
        trace_event(Event::LogFlushPeriodSet, &[("ms", config.log_flush_period_ms.to_string().as_str())]);

        env.set_redzone(config.fs_redzone_percent).or_halt("set_redzone");
        trace_event(Event::RedzoneSet, &[("percent", config.fs_redzone_percent.to_string().as_str())]);

        env.open(&config.data_dir, OpenFlags::transactional(), ENV_MODE).or_halt("env_open");
        let data_dir = config.data_dir.display().to_string();
        log_event_with_fields(Event::EnvOpened, &[("data_dir", data_dir.as_str())]);

        env.checkpointing_set_period(config.checkpoint_period_secs)
            .or_halt("checkpointing_set_period");
        trace_event(Event::CheckpointPeriodSet, &[("secs", config.checkpoint_period_secs.to_string().as_str())]);

        env.cleaner_set_period(config.cleaner_period_secs).or_halt("cleaner_set_period");
        trace_event(Event::CleanerPeriodSet, &[("secs", config.cleaner_period_secs.to_string().as_str())]);

        env.cleaner_set_iterations(config.cleaner_iterations).or_halt("cleaner_set_iterations");
        trace_event(Event::CleanerIterationsSet, &[("iterations", config.cleaner_iterations.to_string().as_str())]);

        self.handle = Handle::Open(env);
        self.cache_size = Some(cache_size);
        scope.complete_with_fields(&[("cache_size", cache_size.to_string().as_str())]);
        Ok(())
    }

    /// Close the environment if one was opened.
    ///
    /// Shutting down an environment that never started is a no-op transition
    /// to Closed. A close failure terminates the process.
    pub fn shutdown(&mut self) -> StoreResult<()> {
        match std::mem::replace(&mut self.handle, Handle::Closed) {
            Handle::Closed => Err(StoreError::env_lifecycle("shutdown called twice")),
            Handle::Unopened => {
                Logger::info(
                    Event::ShutdownComplete.as_str(),
                    &[("reason", "environment was never opened")],
                );
                Ok(())
            }
            Handle::Open(mut env) => {
                let scope = ObservationScope::new("STORAGE_SHUTDOWN");
                env.close().or_halt("env_close");
                Logger::info(Event::EnvClosed.as_str(), &[]);
                scope.complete();
                Ok(())
            }
        }
    }

    pub fn set_log_flush_period(&mut self, millis: u32) -> StoreResult<()> {
        self.engine_env_mut("set_log_flush_period")?
            .change_fsync_log_period(millis)
            .or_halt("change_fsync_log_period");
        self.config.log_flush_period_ms = millis;
        trace_event(Event::LogFlushPeriodSet, &[("ms", millis.to_string().as_str())]);
        Ok(())
    }

    /// Zero would disable checkpointing and is rejected
    pub fn set_checkpoint_period(&mut self, secs: u32) -> StoreResult<()> {
        if secs == 0 {
            return Err(StoreError::invalid_setting("checkpoint period", "must be > 0"));
        }
        self.engine_env_mut("set_checkpoint_period")?
            .checkpointing_set_period(secs)
            .or_halt("checkpointing_set_period");
        self.config.checkpoint_period_secs = secs;
        trace_event(Event::CheckpointPeriodSet, &[("secs", secs.to_string().as_str())]);
        Ok(())
    }

    pub fn set_cleaner_period(&mut self, secs: u32) -> StoreResult<()> {
        self.engine_env_mut("set_cleaner_period")?
            .cleaner_set_period(secs)
            .or_halt("cleaner_set_period");
        self.config.cleaner_period_secs = secs;
        trace_event(Event::CleanerPeriodSet, &[("secs", secs.to_string().as_str())]);
        Ok(())
    }

    pub fn set_cleaner_iterations(&mut self, iterations: u32) -> StoreResult<()> {
        self.engine_env_mut("set_cleaner_iterations")?
            .cleaner_set_iterations(iterations)
            .or_halt("cleaner_set_iterations");
        self.config.cleaner_iterations = iterations;
        trace_event(Event::CleanerIterationsSet, &[("iterations", iterations.to_string().as_str())]);
        Ok(())
    }

    /// Read engine status. Engine failures are returned classified.
    pub fn get_status(&self) -> StoreResult<StatusReport> {
        let env = self.engine_env("get_status")?;
        let max_rows = env.status_row_count().or_classify()?;
        let snapshot = env.engine_status(max_rows).or_classify()?;
        Ok(StatusReport::from_snapshot(&snapshot))
    }

    /// Flush the recovery log. A failure terminates the process.
    pub fn log_flush(&self) -> StoreResult<()> {
        let env = self.engine_env("log_flush")?;
        env.log_flush().or_halt("log_flush");
        Logger::trace(Event::LogFlushComplete.as_str(), &[]);
        Ok(())
    }

    /// Run a checkpoint. A failure terminates the process.
    pub fn checkpoint(&self) -> StoreResult<()> {
        let env = self.engine_env("checkpoint")?;
        let scope = ObservationScope::new("CHECKPOINT");
        env.checkpoint().or_halt("checkpoint");
        scope.complete();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::env::FixedProbe;
    use crate::errors::ErrorCode;
    use tempfile::TempDir;

    fn environment(engine: &MemoryEngine, dir: &TempDir) -> Environment<MemoryEngine> {
        let probe = FixedProbe {
            physical: Some(8 << 30),
            max_data: None,
        };
        Environment::with_probe(engine.clone(), StorageConfig::new(dir.path()), Box::new(probe))
    }

    #[test]
    fn test_startup_configures_engine() {
        let dir = TempDir::new().unwrap();
        let engine = MemoryEngine::new();
        let mut env = environment(&engine, &dir);
        env.startup().unwrap();

        let seen = engine.config();
        assert_eq!(seen.cache_size(), 4 << 30);
        assert_eq!((seen.cache_gigabytes, seen.cache_bytes, seen.caches), (4, 0, 1));
        assert_eq!(seen.lock_max_memory, (4u64 << 30) / 10);
        assert_eq!(seen.lock_timeout_ms, 4000);
        assert_eq!(seen.fsync_log_period_ms, 100);
        assert_eq!(seen.redzone_percent, 5);
        assert_eq!(seen.checkpoint_period_secs, 60);
        assert_eq!(seen.cleaner_period_secs, 2);
        assert_eq!(seen.cleaner_iterations, 5);
        assert_eq!(seen.error_prefix, ERROR_PREFIX);
        assert_eq!(seen.flags, Some(OpenFlags::transactional()));
        assert_eq!(seen.mode, Some(0o755));
        assert!(seen.compare_registered);
        assert_eq!(env.cache_size(), Some(4 << 30));
        assert!(env.is_open());
    }

    #[test]
    fn test_lifecycle_transitions_happen_once() {
        let dir = TempDir::new().unwrap();
        let engine = MemoryEngine::new();
        let mut env = environment(&engine, &dir);
        assert_eq!(env.state(), EnvState::Unopened);
        env.startup().unwrap();
        assert_eq!(env.startup().unwrap_err().code(), ErrorCode::EnvLifecycle);
        env.shutdown().unwrap();
        assert_eq!(env.state(), EnvState::Closed);
        assert!(!engine.is_open());
        assert_eq!(env.shutdown().unwrap_err().code(), ErrorCode::EnvLifecycle);
        assert_eq!(env.startup().unwrap_err().code(), ErrorCode::EnvLifecycle);
    }

    #[test]
    fn test_shutdown_without_startup() {
        let dir = TempDir::new().unwrap();
        let mut env = environment(&MemoryEngine::new(), &dir);
        env.shutdown().unwrap();
        assert_eq!(env.state(), EnvState::Closed);
    }

    #[test]
    fn test_operations_require_open() {
        let dir = TempDir::new().unwrap();
        let mut env = environment(&MemoryEngine::new(), &dir);
        assert_eq!(env.checkpoint().unwrap_err().code(), ErrorCode::EnvNotOpen);
        assert_eq!(env.log_flush().unwrap_err().code(), ErrorCode::EnvNotOpen);
        assert_eq!(env.get_status().unwrap_err().code(), ErrorCode::EnvNotOpen);
        assert_eq!(env.set_cleaner_period(3).unwrap_err().code(), ErrorCode::EnvNotOpen);
    }

    #[test]
    fn test_runtime_setters_update_config() {
        let dir = TempDir::new().unwrap();
        let engine = MemoryEngine::new();
        let mut env = environment(&engine, &dir);
        env.startup().unwrap();

        env.set_log_flush_period(250).unwrap();
        env.set_checkpoint_period(120).unwrap();
        env.set_cleaner_period(7).unwrap();
        env.set_cleaner_iterations(11).unwrap();

        assert_eq!(env.config().log_flush_period_ms, 250);
        assert_eq!(env.config().checkpoint_period_secs, 120);
        assert_eq!(env.config().cleaner_period_secs, 7);
        assert_eq!(env.config().cleaner_iterations, 11);

        let seen = engine.config();
        assert_eq!(seen.fsync_log_period_ms, 250);
        assert_eq!(seen.cleaner_period_secs, 7);
        assert_eq!(seen.cleaner_iterations, 11);

        let err = env.set_checkpoint_period(0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSetting);
        assert_eq!(env.config().checkpoint_period_secs, 120);
    }

    #[test]
    fn test_huge_pages_advisory_does_not_stop_startup() {
        let dir = TempDir::new().unwrap();
        let engine = MemoryEngine::new();
        engine.set_huge_pages(true);
        let mut env = environment(&engine, &dir);
        env.startup().unwrap();
        assert!(env.is_open());
    }

    #[test]
    fn test_durability_triggers() {
        let dir = TempDir::new().unwrap();
        let engine = MemoryEngine::new();
        let mut env = environment(&engine, &dir);
        env.startup().unwrap();
        env.log_flush().unwrap();
        env.checkpoint().unwrap();
        env.checkpoint().unwrap();
        assert_eq!(engine.log_flushes(), 1);
        assert_eq!(engine.checkpoints(), 2);
    }

    #[test]
    fn test_status_errors_are_catchable() {
        let dir = TempDir::new().unwrap();
        let engine = MemoryEngine::new();
        let mut env = environment(&engine, &dir);
        env.startup().unwrap();
        engine.inject_fault("engine_status", crate::errors::status::LOCK_NOT_GRANTED);
        let err = env.get_status().unwrap_err();
        assert!(err.is_retryable());
    }
}
