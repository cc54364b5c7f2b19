//! Storage environment management
//!
//! Owns the engine environment for the lifetime of the process: startup
//! configuration and open, shutdown, runtime tuning, status reporting and
//! the durability triggers (log flush, checkpoint).

mod cache;
mod manager;
mod status;

pub use cache::{
    lock_memory_for, resolve_cache_size, split_cache_size, CacheSplit, FixedProbe, MemoryProbe,
    SystemProbe,
};
pub use manager::{EnvState, Environment, ERROR_PREFIX};
pub use status::{FilesystemStatus, StatusField, StatusReport};
