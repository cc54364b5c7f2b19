//! strata - storage-engine integration layer
//!
//! Binds an ordered key/value engine to a document store: environment
//! lifecycle, dictionary (table) management, the descriptor-driven key
//! comparator, engine error classification and indexed-path tracking.

pub mod cli;
pub mod config;
pub mod dictionary;
pub mod document;
pub mod engine;
pub mod env;
pub mod errors;
pub mod index_paths;
pub mod keys;
pub mod observability;
