//! Dictionary management
//!
//! A dictionary is one ordered table, the physical storage of an index.
//! Each is bound at creation to the [`KeyOrdering`](crate::keys::KeyOrdering)
//! derived from its key pattern, persisted as the table's descriptor and
//! verified on every open.

mod manager;
mod options;
mod txn;

pub use manager::{Dictionary, DictionaryManager};
pub use options::{DictionaryOptions, DEFAULT_PAGE_SIZE, DEFAULT_READ_PAGE_SIZE};
pub use txn::{EphemeralTxn, Session, TxnContext};
