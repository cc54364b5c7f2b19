//! The narrow engine API the storage layer is written against.
//!
//! Three handle types, mirroring the engine's own object model:
//!
//! - [`Engine`]: process-level entry point; creates the environment handle
//! - [`EngineEnv`]: one environment (cache, lock tree, log, checkpointer)
//! - [`EngineDictionary`]: one ordered table inside an environment
//!
//! plus [`EngineTxn`] for engine transactions. Every fallible call reports
//! a raw [`EngineStatus`]; classification happens in the callers.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::errors::{EngineResult, EngineStatus};

/// Key comparison function registered with the engine.
///
/// Receives the dictionary's stored descriptor and the two keys. Must be
/// pure and callable from any thread.
pub type KeyCompareFn = fn(descriptor: &[u8], a: &[u8], b: &[u8]) -> CmpOrdering;

/// Receives engine diagnostics as `(prefix, message)`
pub type ErrorCallback = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Result of creating an environment handle.
///
/// The engine may hand back a usable handle together with an advisory
/// status that the caller should surface but that does not prevent startup.
#[derive(Debug)]
pub struct Created<T> {
    pub env: T,
    pub advisory: Option<EngineStatus>,
}

impl<T> Created<T> {
    pub fn new(env: T) -> Self {
        Self { env, advisory: None }
    }

    pub fn with_advisory(env: T, advisory: EngineStatus) -> Self {
        Self {
            env,
            advisory: Some(advisory),
        }
    }
}

/// Subsystems and behavior requested when opening an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
    /// Create environment files if absent
    pub create: bool,
    /// Locking is private to this process
    pub private: bool,
    /// Run crash recovery on open
    pub recover: bool,
    pub init_lock: bool,
    pub init_cache: bool,
    pub init_txn: bool,
    pub init_log: bool,
}

impl OpenFlags {
    /// The flags a document database opens its environment with
    pub const fn transactional() -> Self {
        Self {
            create: true,
            private: true,
            recover: true,
            init_lock: true,
            init_cache: true,
            init_txn: true,
            init_log: true,
        }
    }
}

/// Environment directory permissions (rwxr-xr-x)
pub const ENV_MODE: u32 = 0o755;
/// Dictionary file permissions (rw-r--r--)
pub const DICTIONARY_MODE: u32 = 0o644;

/// Per-dictionary compression method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    Lzma,
    QuickLz,
    #[default]
    Zlib,
    None,
}

impl Compression {
    /// Parse the option string accepted by dictionary creation
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "lzma" => Some(Compression::Lzma),
            "quicklz" => Some(Compression::QuickLz),
            "zlib" => Some(Compression::Zlib),
            "none" => Some(Compression::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Lzma => "lzma",
            Compression::QuickLz => "quicklz",
            Compression::Zlib => "zlib",
            Compression::None => "none",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed engine status value
#[derive(Debug, Clone, PartialEq)]
pub enum StatusValue {
    Integer(u64),
    Text(String),
    /// Seconds since the Unix epoch
    Timestamp(i64),
    Duration(Duration),
    /// Per-thread partitioned counter; the reported value is the sum
    Counter(Vec<u64>),
}

/// One row of engine status
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub key: String,
    pub legend: String,
    pub value: StatusValue,
}

impl StatusRow {
    pub fn new(key: impl Into<String>, legend: impl Into<String>, value: StatusValue) -> Self {
        Self {
            key: key.into(),
            legend: legend.into(),
            value,
        }
    }
}

/// A full engine status read
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// Raw filesystem redzone state
    pub redzone_state: u32,
    pub panic: u64,
    pub panic_string: String,
    pub rows: Vec<StatusRow>,
}

/// Process-level engine entry point
pub trait Engine {
    type Env: EngineEnv;

    /// Direct I/O mode; must be set before the environment is created
    fn set_direct_io(&mut self, enabled: bool);

    /// Create an unopened environment handle
    fn create_env(&mut self) -> EngineResult<Created<Self::Env>>;
}

/// An engine environment
pub trait EngineEnv {
    type Txn: EngineTxn;
    type Dictionary: EngineDictionary<Txn = Self::Txn>;

    fn set_error_callback(&mut self, callback: ErrorCallback);
    fn set_error_prefix(&mut self, prefix: &str);

    /// Two-part cache size: `gigabytes * 2^30 + bytes`, over `caches` segments
    fn set_cache_size(&mut self, gigabytes: u32, bytes: u32, caches: u32) -> EngineResult<()>;
    fn set_lock_max_memory(&mut self, bytes: u64) -> EngineResult<()>;
    fn set_lock_timeout(&mut self, millis: u64) -> EngineResult<()>;
    fn set_default_compare(&mut self, compare: KeyCompareFn) -> EngineResult<()>;
    fn change_fsync_log_period(&mut self, millis: u32) -> EngineResult<()>;
    fn set_redzone(&mut self, percent: u32) -> EngineResult<()>;

    fn open(&mut self, dir: &Path, flags: OpenFlags, mode: u32) -> EngineResult<()>;
    fn close(&mut self) -> EngineResult<()>;

    fn checkpointing_set_period(&mut self, secs: u32) -> EngineResult<()>;
    fn cleaner_set_period(&mut self, secs: u32) -> EngineResult<()>;
    fn cleaner_set_iterations(&mut self, iterations: u32) -> EngineResult<()>;

    /// Upper bound on the number of status rows
    fn status_row_count(&self) -> EngineResult<usize>;

    /// Read status into a snapshot holding at most `max_rows` rows
    fn engine_status(&self, max_rows: usize) -> EngineResult<StatusSnapshot>;

    /// Flush the recovery log up to the last committed transaction
    fn log_flush(&self) -> EngineResult<()>;
    fn checkpoint(&self) -> EngineResult<()>;

    fn begin_txn(&self, parent: Option<&Self::Txn>, read_only: bool) -> EngineResult<Self::Txn>;

    /// Create an unopened dictionary handle
    fn create_dictionary(&self) -> EngineResult<Self::Dictionary>;
    fn remove_dictionary(&self, txn: Option<&Self::Txn>, name: &str) -> EngineResult<()>;
    fn rename_dictionary(&self, txn: Option<&Self::Txn>, old: &str, new: &str) -> EngineResult<()>;
}

/// One ordered table
pub trait EngineDictionary {
    type Txn: EngineTxn;

    fn set_read_page_size(&mut self, bytes: u32) -> EngineResult<()>;
    fn set_page_size(&mut self, bytes: u32) -> EngineResult<()>;
    fn set_compression(&mut self, method: Compression) -> EngineResult<()>;

    /// Open by name; `create` creates the table when it does not exist.
    ///
    /// Returns whether this call created the table.
    fn open(&mut self, txn: Option<&Self::Txn>, name: &str, create: bool, mode: u32) -> EngineResult<bool>;

    /// Replace the comparison descriptor
    fn change_descriptor(&mut self, txn: Option<&Self::Txn>, descriptor: &[u8]) -> EngineResult<()>;

    /// The stored comparison descriptor, empty if never set
    fn descriptor(&self) -> Vec<u8>;

    fn close(self) -> EngineResult<()>;
}

/// An engine transaction
pub trait EngineTxn {
    fn id(&self) -> u64;
    fn is_read_only(&self) -> bool;
    fn commit(self) -> EngineResult<()>;
    fn abort(self) -> EngineResult<()>;
}
