//! Index key ordering
//!
//! - [`KeyOrdering`]: per-field directions derived from a key pattern, and
//!   the fixed-size descriptor persisted with each dictionary
//! - Encoded entries: a self-describing leading key, optionally followed by
//!   an identifying document fragment
//! - The comparator the engine calls on every key comparison
//!
//! The ordering bound to a dictionary never changes after creation. The
//! comparator only reads it.

mod comparator;
mod encoding;
mod ordering;

pub use comparator::{compare_documents, compare_entries, compare_with_descriptor, try_compare, CompareError};
pub use encoding::{encode_entry, encode_key, split_entry, KeyValues, LeadingKey};
pub use ordering::KeyOrdering;
