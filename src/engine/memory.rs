//! In-memory reference engine
//!
//! Implements the engine API in-process so the storage layer can run and be
//! tested without a native engine. It records every configured value, keeps
//! each table's entries ordered by the registered comparator, and reports
//! status rows. Transactions are tracked but not isolated.
//!
//! Any engine call can be made to fail with [`MemoryEngine::inject_fault`],
//! keyed by operation name: `create_env`, `set_cache_size`,
//! `set_lock_max_memory`, `set_lock_timeout`, `set_default_compare`,
//! `change_fsync_log_period`, `set_redzone`, `env_open`, `env_close`,
//! `checkpointing_set_period`, `cleaner_set_period`,
//! `cleaner_set_iterations`, `status_row_count`, `engine_status`,
//! `log_flush`, `checkpoint`, `begin_txn`, `txn_commit`, `txn_abort`,
//! `create_dictionary`, `remove_dictionary`, `rename_dictionary`,
//! `set_read_page_size`, `set_page_size`, `set_compression`,
//! `dictionary_open`, `change_descriptor`, `dictionary_close`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::errors::status::{self, HUGE_PAGES_ENABLED};
use crate::errors::{EngineResult, EngineStatus};

use super::traits::{
    Compression, Created, Engine, EngineDictionary, EngineEnv, EngineTxn, ErrorCallback,
    KeyCompareFn, OpenFlags, StatusRow, StatusSnapshot, StatusValue,
};

const EINVAL: i32 = 22;
const EEXIST: i32 = 17;

/// Everything the storage layer configured on the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryConfig {
    pub direct_io: bool,
    pub cache_gigabytes: u32,
    pub cache_bytes: u32,
    pub caches: u32,
    pub lock_max_memory: u64,
    pub lock_timeout_ms: u64,
    pub fsync_log_period_ms: u32,
    pub redzone_percent: u32,
    pub dir: Option<PathBuf>,
    pub flags: Option<OpenFlags>,
    pub mode: Option<u32>,
    pub checkpoint_period_secs: u32,
    pub cleaner_period_secs: u32,
    pub cleaner_iterations: u32,
    pub error_prefix: String,
    pub compare_registered: bool,
}

impl MemoryConfig {
    /// Cache size in bytes, recombined from its two parts
    pub fn cache_size(&self) -> u64 {
        ((self.cache_gigabytes as u64) << 30) + self.cache_bytes as u64
    }
}

/// A dictionary open as seen by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRecord {
    pub name: String,
    pub txn: Option<u64>,
    pub create: bool,
}

/// Transaction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxnStats {
    pub begun: u64,
    pub committed: u64,
    pub aborted: u64,
}

impl TxnStats {
    pub fn active(&self) -> u64 {
        self.begun - self.committed - self.aborted
    }
}

#[derive(Debug, Clone, Default)]
struct Table {
    descriptor: Vec<u8>,
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    read_page_size: u32,
    page_size: u32,
    compression: Compression,
}

#[derive(Default)]
struct MemoryState {
    config: MemoryConfig,
    faults: HashMap<String, i32>,
    huge_pages: bool,
    open: bool,
    compare: Option<KeyCompareFn>,
    error_callback: Option<ErrorCallback>,
    tables: BTreeMap<String, Table>,
    redzone_state: u32,
    panic: u64,
    panic_string: String,
    extra_rows: Vec<StatusRow>,
    next_txn: u64,
    txns: TxnStats,
    opens: Vec<OpenRecord>,
    checkpoints: u64,
    last_checkpoint: i64,
    checkpoint_time: Duration,
    log_flushes: u64,
}

impl MemoryState {
    /// Injected status for `op`, reported through the error callback
    fn fault(&self, op: &str) -> EngineResult<()> {
        match self.faults.get(op) {
            Some(&code) => {
                if let Some(ref callback) = self.error_callback {
                    callback(&self.config.error_prefix, &format!("{} failed with status {}", op, code));
                }
                Err(EngineStatus::new(code))
            }
            None => Ok(()),
        }
    }

    fn require_open(&self) -> EngineResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(EngineStatus::new(EINVAL))
        }
    }

    fn rows(&self) -> Vec<StatusRow> {
        let mut rows = vec![
            StatusRow::new("cachetable: size limit", "cachetable: size limit", StatusValue::Integer(self.config.cache_size())),
            StatusRow::new("locktree: memory size limit", "locktree: memory size limit", StatusValue::Integer(self.config.lock_max_memory)),
            StatusRow::new("logger: fsync period", "logger: fsync period (ms)", StatusValue::Integer(self.config.fsync_log_period_ms as u64)),
            StatusRow::new("logger: flushes", "logger: log flushes", StatusValue::Integer(self.log_flushes)),
            StatusRow::new("checkpoint: period", "checkpoint: period (s)", StatusValue::Integer(self.config.checkpoint_period_secs as u64)),
            StatusRow::new("checkpoint: checkpoints taken", "checkpoint: checkpoints taken", StatusValue::Integer(self.checkpoints)),
            StatusRow::new("checkpoint: last checkpoint began", "checkpoint: last checkpoint began", StatusValue::Timestamp(self.last_checkpoint)),
            StatusRow::new("checkpoint: time spent", "checkpoint: time spent during checkpoint", StatusValue::Duration(self.checkpoint_time)),
            StatusRow::new("txn: commits", "txn: transactions committed", StatusValue::Counter(vec![self.txns.committed])),
            StatusRow::new("txn: aborts", "txn: transactions aborted", StatusValue::Counter(vec![self.txns.aborted])),
            StatusRow::new("engine: backend", "engine: backend", StatusValue::Text("memory".to_string())),
        ];
        rows.extend(self.extra_rows.iter().cloned());
        rows
    }
}

fn lock(shared: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The in-memory engine. Clones share state, so a test can keep one to
/// inspect what the storage layer did.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    shared: Arc<Mutex<MemoryState>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `op` fail with `code`
    pub fn inject_fault(&self, op: &str, code: i32) {
        lock(&self.shared).faults.insert(op.to_string(), code);
    }

    pub fn clear_fault(&self, op: &str) {
        lock(&self.shared).faults.remove(op);
    }

    /// Report transparent huge pages as an advisory on environment creation
    pub fn set_huge_pages(&self, enabled: bool) {
        lock(&self.shared).huge_pages = enabled;
    }

    pub fn set_redzone_state(&self, state: u32) {
        lock(&self.shared).redzone_state = state;
    }

    pub fn set_panic(&self, code: u64, message: &str) {
        let mut s = lock(&self.shared);
        s.panic = code;
        s.panic_string = message.to_string();
    }

    /// Report an additional status row
    pub fn push_status_row(&self, row: StatusRow) {
        lock(&self.shared).extra_rows.push(row);
    }

    pub fn config(&self) -> MemoryConfig {
        lock(&self.shared).config.clone()
    }

    pub fn is_open(&self) -> bool {
        lock(&self.shared).open
    }

    pub fn table_names(&self) -> Vec<String> {
        lock(&self.shared).tables.keys().cloned().collect()
    }

    pub fn table_descriptor(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.shared).tables.get(name).map(|t| t.descriptor.clone())
    }

    /// Page sizes and compression a table was created with
    pub fn table_options(&self, name: &str) -> Option<(u32, u32, Compression)> {
        lock(&self.shared)
            .tables
            .get(name)
            .map(|t| (t.read_page_size, t.page_size, t.compression))
    }

    /// Replace a stored descriptor behind the storage layer's back
    pub fn overwrite_descriptor(&self, name: &str, descriptor: &[u8]) -> bool {
        match lock(&self.shared).tables.get_mut(name) {
            Some(table) => {
                table.descriptor = descriptor.to_vec();
                true
            }
            None => false,
        }
    }

    /// Dictionary opens in call order
    pub fn opens(&self) -> Vec<OpenRecord> {
        lock(&self.shared).opens.clone()
    }

    pub fn txn_stats(&self) -> TxnStats {
        lock(&self.shared).txns
    }

    pub fn checkpoints(&self) -> u64 {
        lock(&self.shared).checkpoints
    }

    pub fn log_flushes(&self) -> u64 {
        lock(&self.shared).log_flushes
    }
}

impl Engine for MemoryEngine {
    type Env = MemoryEnv;

    fn set_direct_io(&mut self, enabled: bool) {
        lock(&self.shared).config.direct_io = enabled;
    }

    fn create_env(&mut self) -> EngineResult<Created<MemoryEnv>> {
        let mut s = lock(&self.shared);
        s.fault("create_env")?;
        let env = MemoryEnv {
            shared: Arc::clone(&self.shared),
        };
        if s.huge_pages {
            Ok(Created::with_advisory(env, EngineStatus::new(HUGE_PAGES_ENABLED)))
        } else {
            Ok(Created::new(env))
        }
    }
}

/// Environment handle of the in-memory engine
pub struct MemoryEnv {
    shared: Arc<Mutex<MemoryState>>,
}

impl EngineEnv for MemoryEnv {
    type Txn = MemoryTxn;
    type Dictionary = MemoryDictionary;

    fn set_error_callback(&mut self, callback: ErrorCallback) {
        lock(&self.shared).error_callback = Some(callback);
    }

    fn set_error_prefix(&mut self, prefix: &str) {
        lock(&self.shared).config.error_prefix = prefix.to_string();
    }

    fn set_cache_size(&mut self, gigabytes: u32, bytes: u32, caches: u32) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("set_cache_size")?;
        s.config.cache_gigabytes = gigabytes;
        s.config.cache_bytes = bytes;
        s.config.caches = caches;
        Ok(())
    }

    fn set_lock_max_memory(&mut self, bytes: u64) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("set_lock_max_memory")?;
        s.config.lock_max_memory = bytes;
        Ok(())
    }

    fn set_lock_timeout(&mut self, millis: u64) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("set_lock_timeout")?;
        s.config.lock_timeout_ms = millis;
        Ok(())
    }

    fn set_default_compare(&mut self, compare: KeyCompareFn) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("set_default_compare")?;
        s.compare = Some(compare);
        s.config.compare_registered = true;
        Ok(())
    }

    fn change_fsync_log_period(&mut self, millis: u32) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("change_fsync_log_period")?;
        s.config.fsync_log_period_ms = millis;
        Ok(())
    }

    fn set_redzone(&mut self, percent: u32) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("set_redzone")?;
        s.config.redzone_percent = percent;
        Ok(())
    }

    fn open(&mut self, dir: &Path, flags: OpenFlags, mode: u32) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("env_open")?;
        if s.open {
            return Err(EngineStatus::new(EINVAL));
        }
        if !dir.is_dir() {
            return Err(EngineStatus::new(status::ENOENT));
        }
        s.config.dir = Some(dir.to_path_buf());
        s.config.flags = Some(flags);
        s.config.mode = Some(mode);
        s.open = true;
        Ok(())
    }

    fn close(&mut self) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("env_close")?;
        s.require_open()?;
        s.open = false;
        Ok(())
    }

    fn checkpointing_set_period(&mut self, secs: u32) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("checkpointing_set_period")?;
        s.config.checkpoint_period_secs = secs;
        Ok(())
    }

    fn cleaner_set_period(&mut self, secs: u32) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("cleaner_set_period")?;
        s.config.cleaner_period_secs = secs;
        Ok(())
    }

    fn cleaner_set_iterations(&mut self, iterations: u32) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("cleaner_set_iterations")?;
        s.config.cleaner_iterations = iterations;
        Ok(())
    }

    fn status_row_count(&self) -> EngineResult<usize> {
        let s = lock(&self.shared);
        s.fault("status_row_count")?;
        Ok(s.rows().len())
    }

    fn engine_status(&self, max_rows: usize) -> EngineResult<StatusSnapshot> {
        let s = lock(&self.shared);
        s.fault("engine_status")?;
        let mut rows = Vec::with_capacity(max_rows);
        rows.extend(s.rows().into_iter().take(max_rows));
        Ok(StatusSnapshot {
            redzone_state: s.redzone_state,
            panic: s.panic,
            panic_string: s.panic_string.clone(),
            rows,
        })
    }

    fn log_flush(&self) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("log_flush")?;
        s.require_open()?;
        s.log_flushes += 1;
        Ok(())
    }

    fn checkpoint(&self) -> EngineResult<()> {
        let started = Instant::now();
        let mut s = lock(&self.shared);
        s.fault("checkpoint")?;
        s.require_open()?;
        s.checkpoints += 1;
        s.last_checkpoint = chrono::Utc::now().timestamp();
        s.checkpoint_time += started.elapsed();
        Ok(())
    }

    fn begin_txn(&self, parent: Option<&MemoryTxn>, read_only: bool) -> EngineResult<MemoryTxn> {
        let mut s = lock(&self.shared);
        s.fault("begin_txn")?;
        s.require_open()?;
        s.next_txn += 1;
        s.txns.begun += 1;
        Ok(MemoryTxn {
            shared: Arc::clone(&self.shared),
            id: s.next_txn,
            read_only: read_only || parent.map(|p| p.read_only).unwrap_or(false),
        })
    }

    fn create_dictionary(&self) -> EngineResult<MemoryDictionary> {
        let s = lock(&self.shared);
        s.fault("create_dictionary")?;
        s.require_open()?;
        Ok(MemoryDictionary {
            shared: Arc::clone(&self.shared),
            name: None,
            read_page_size: 0,
            page_size: 0,
            compression: Compression::default(),
        })
    }

    fn remove_dictionary(&self, _txn: Option<&MemoryTxn>, name: &str) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("remove_dictionary")?;
        s.require_open()?;
        match s.tables.remove(name) {
            Some(_) => Ok(()),
            None => Err(EngineStatus::new(status::ENOENT)),
        }
    }

    fn rename_dictionary(&self, _txn: Option<&MemoryTxn>, old: &str, new: &str) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("rename_dictionary")?;
        s.require_open()?;
        if s.tables.contains_key(new) {
            return Err(EngineStatus::new(EEXIST));
        }
        let table = s.tables.remove(old).ok_or(EngineStatus::new(status::ENOENT))?;
        s.tables.insert(new.to_string(), table);
        Ok(())
    }
}

/// Transaction handle of the in-memory engine
pub struct MemoryTxn {
    shared: Arc<Mutex<MemoryState>>,
    id: u64,
    read_only: bool,
}

impl EngineTxn for MemoryTxn {
    fn id(&self) -> u64 {
        self.id
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn commit(self) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("txn_commit")?;
        s.txns.committed += 1;
        Ok(())
    }

    fn abort(self) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("txn_abort")?;
        s.txns.aborted += 1;
        Ok(())
    }
}

/// Dictionary handle of the in-memory engine
pub struct MemoryDictionary {
    shared: Arc<Mutex<MemoryState>>,
    name: Option<String>,
    read_page_size: u32,
    page_size: u32,
    compression: Compression,
}

impl MemoryDictionary {
    /// Insert an entry, ordered by the registered comparator.
    ///
    /// A key comparing equal to an existing one is `KEY_EXISTS`.
    pub fn insert(&self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.require_open()?;
        let compare = s.compare;
        let name = self.name.as_deref().ok_or(EngineStatus::new(EINVAL))?;
        let table = s.tables.get_mut(name).ok_or(EngineStatus::new(status::ENOENT))?;
        let descriptor = table.descriptor.clone();
        let position = table.entries.binary_search_by(|(existing, _)| match compare {
            Some(f) => f(&descriptor, existing, key),
            None => existing.as_slice().cmp(key),
        });
        match position {
            Ok(_) => Err(EngineStatus::new(status::KEY_EXISTS)),
            Err(at) => {
                table.entries.insert(at, (key.to_vec(), value.to_vec()));
                Ok(())
            }
        }
    }

    /// Keys in table order
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let s = lock(&self.shared);
        self.name
            .as_deref()
            .and_then(|name| s.tables.get(name))
            .map(|t| t.entries.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        let s = lock(&self.shared);
        self.name
            .as_deref()
            .and_then(|name| s.tables.get(name))
            .map(|t| t.entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl EngineDictionary for MemoryDictionary {
    type Txn = MemoryTxn;

    fn set_read_page_size(&mut self, bytes: u32) -> EngineResult<()> {
        lock(&self.shared).fault("set_read_page_size")?;
        self.read_page_size = bytes;
        Ok(())
    }

    fn set_page_size(&mut self, bytes: u32) -> EngineResult<()> {
        lock(&self.shared).fault("set_page_size")?;
        self.page_size = bytes;
        Ok(())
    }

    fn set_compression(&mut self, method: Compression) -> EngineResult<()> {
        lock(&self.shared).fault("set_compression")?;
        self.compression = method;
        Ok(())
    }

    fn open(&mut self, txn: Option<&MemoryTxn>, name: &str, create: bool, _mode: u32) -> EngineResult<bool> {
        let mut s = lock(&self.shared);
        s.fault("dictionary_open")?;
        s.require_open()?;
        s.opens.push(OpenRecord {
            name: name.to_string(),
            txn: txn.map(|t| t.id),
            create,
        });
        let created = !s.tables.contains_key(name);
        if created {
            if !create {
                return Err(EngineStatus::new(status::ENOENT));
            }
            let table = Table {
                read_page_size: self.read_page_size,
                page_size: self.page_size,
                compression: self.compression,
                ..Table::default()
            };
            s.tables.insert(name.to_string(), table);
        }
        self.name = Some(name.to_string());
        Ok(created)
    }

    fn change_descriptor(&mut self, _txn: Option<&MemoryTxn>, descriptor: &[u8]) -> EngineResult<()> {
        let mut s = lock(&self.shared);
        s.fault("change_descriptor")?;
        let name = self.name.as_deref().ok_or(EngineStatus::new(EINVAL))?;
        let table = s.tables.get_mut(name).ok_or(EngineStatus::new(status::ENOENT))?;
        table.descriptor = descriptor.to_vec();
        Ok(())
    }

    fn descriptor(&self) -> Vec<u8> {
        let s = lock(&self.shared);
        self.name
            .as_deref()
            .and_then(|name| s.tables.get(name))
            .map(|t| t.descriptor.clone())
            .unwrap_or_default()
    }

    fn close(self) -> EngineResult<()> {
        lock(&self.shared).fault("dictionary_close")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_env(engine: &mut MemoryEngine, dir: &Path) -> MemoryEnv {
        let mut env = engine.create_env().unwrap().env;
        env.open(dir, OpenFlags::transactional(), 0o755).unwrap();
        env
    }

    #[test]
    fn test_open_requires_existing_directory() {
        let mut engine = MemoryEngine::new();
        let mut env = engine.create_env().unwrap().env;
        let err = env
            .open(Path::new("/nonexistent/strata"), OpenFlags::transactional(), 0o755)
            .unwrap_err();
        assert_eq!(err.code(), status::ENOENT);
        assert!(!engine.is_open());
    }

    #[test]
    fn test_injected_fault_is_reported_through_callback() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut engine = MemoryEngine::new();
        let mut env = open_env(&mut engine, temp.path());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        env.set_error_prefix("test");
        env.set_error_callback(Box::new(move |prefix, msg| {
            sink.lock().unwrap().push(format!("{}: {}", prefix, msg));
        }));

        engine.inject_fault("checkpoint", status::BAD_CHECKSUM);
        assert_eq!(env.checkpoint().unwrap_err().code(), status::BAD_CHECKSUM);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(seen.lock().unwrap()[0].starts_with("test: checkpoint failed"));

        engine.clear_fault("checkpoint");
        env.checkpoint().unwrap();
        assert_eq!(engine.checkpoints(), 1);
    }

    #[test]
    fn test_dictionary_create_and_reopen() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut engine = MemoryEngine::new();
        let env = open_env(&mut engine, temp.path());

        let mut missing = env.create_dictionary().unwrap();
        assert_eq!(missing.open(None, "t", false, 0o644).unwrap_err().code(), status::ENOENT);

        let mut created = env.create_dictionary().unwrap();
        created.set_page_size(1024).unwrap();
        assert!(created.open(None, "t", true, 0o644).unwrap());
        created.change_descriptor(None, &[1, 0, 0, 0]).unwrap();
        created.close().unwrap();

        let mut reopened = env.create_dictionary().unwrap();
        assert!(!reopened.open(None, "t", false, 0o644).unwrap());
        assert_eq!(reopened.descriptor(), vec![1, 0, 0, 0]);
        assert_eq!(engine.table_options("t").map(|o| o.1), Some(1024));

        let mut existing = env.create_dictionary().unwrap();
        assert!(!existing.open(None, "t", true, 0o644).unwrap());
        assert_eq!(existing.descriptor(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_insert_orders_with_registered_comparator() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut engine = MemoryEngine::new();
        let mut env = open_env(&mut engine, temp.path());
        env.set_default_compare(|_, a, b| b.cmp(a)).unwrap();

        let mut dict = env.create_dictionary().unwrap();
        dict.open(None, "t", true, 0o644).unwrap();
        dict.insert(b"a", b"").unwrap();
        dict.insert(b"c", b"").unwrap();
        dict.insert(b"b", b"").unwrap();
        assert_eq!(dict.keys(), vec![b"c".to_vec(), b"b".to_vec(), b"a".to_vec()]);
        assert_eq!(dict.insert(b"b", b"").unwrap_err().code(), status::KEY_EXISTS);
    }

    #[test]
    fn test_rename_and_remove() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut engine = MemoryEngine::new();
        let env = open_env(&mut engine, temp.path());
        for name in ["a", "b"] {
            let mut dict = env.create_dictionary().unwrap();
            dict.open(None, name, true, 0o644).unwrap();
        }
        assert_eq!(env.rename_dictionary(None, "a", "b").unwrap_err().code(), EEXIST);
        env.rename_dictionary(None, "a", "c").unwrap();
        assert_eq!(engine.table_names(), vec!["b".to_string(), "c".to_string()]);
        env.remove_dictionary(None, "b").unwrap();
        assert_eq!(env.remove_dictionary(None, "b").unwrap_err().code(), status::ENOENT);
    }

    #[test]
    fn test_txn_accounting() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut engine = MemoryEngine::new();
        let env = open_env(&mut engine, temp.path());
        let parent = env.begin_txn(None, true).unwrap();
        let child = env.begin_txn(Some(&parent), false).unwrap();
        assert!(child.is_read_only());
        child.commit().unwrap();
        parent.abort().unwrap();
        let stats = engine.txn_stats();
        assert_eq!((stats.begun, stats.committed, stats.aborted, stats.active()), (2, 1, 1, 0));
    }

    #[test]
    fn test_status_rows_truncate_to_capacity() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut engine = MemoryEngine::new();
        let env = open_env(&mut engine, temp.path());
        let count = env.status_row_count().unwrap();
        assert!(count > 2);
        assert_eq!(env.engine_status(count).unwrap().rows.len(), count);
        assert_eq!(env.engine_status(2).unwrap().rows.len(), 2);
    }

    #[test]
    fn test_huge_pages_advisory() {
        let mut engine = MemoryEngine::new();
        engine.set_huge_pages(true);
        let created = engine.create_env().unwrap();
        assert_eq!(created.advisory.map(|s| s.code()), Some(HUGE_PAGES_ENABLED));
    }
}
