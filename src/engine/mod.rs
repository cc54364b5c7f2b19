//! Engine seam
//!
//! The storage layer talks to the transactional key/value engine only
//! through the traits in this module. [`memory::MemoryEngine`] is the
//! in-process reference backend.

pub mod memory;
mod traits;

pub use memory::MemoryEngine;
pub use traits::{
    Compression, Created, Engine, EngineDictionary, EngineEnv, EngineTxn, ErrorCallback,
    KeyCompareFn, OpenFlags, StatusRow, StatusSnapshot, StatusValue, DICTIONARY_MODE, ENV_MODE,
};
