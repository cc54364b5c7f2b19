//! Per-dictionary options
//!
//! Validated in full before any engine handle is created, so invalid input
//! never leaves engine-side state behind.

use crate::document::{Document, Value};
use crate::engine::Compression;
use crate::errors::{StoreError, StoreResult};

pub const DEFAULT_READ_PAGE_SIZE: u32 = 64 * 1024;
pub const DEFAULT_PAGE_SIZE: u32 = 4 * 1024 * 1024;

/// Validated page sizes and compression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryOptions {
    pub read_page_size: u32,
    pub page_size: u32,
    pub compression: Compression,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            read_page_size: DEFAULT_READ_PAGE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            compression: Compression::default(),
        }
    }
}

impl DictionaryOptions {
    /// Read `readPageSize`, `pageSize` and `compression` from an options
    /// document. Absent or null fields keep their defaults.
    pub fn from_info(info: &Document) -> StoreResult<Self> {
        let mut options = Self::default();

        if let Some(value) = present(info, "readPageSize") {
            options.read_page_size =
                positive_int(value).ok_or_else(|| StoreError::invalid_read_page_size(value))?;
        }
        if let Some(value) = present(info, "pageSize") {
            options.page_size =
                positive_int(value).ok_or_else(|| StoreError::invalid_page_size(value))?;
        }
        if let Some(value) = present(info, "compression") {
            options.compression = value
                .as_str()
                .and_then(Compression::parse)
                .ok_or_else(|| StoreError::invalid_compression(value))?;
        }
        Ok(options)
    }
}

fn present<'a>(info: &'a Document, name: &str) -> Option<&'a Value> {
    info.get(name).filter(|v| !matches!(v, Value::Null))
}

/// A number whose integer part is in `1..=i32::MAX`
fn positive_int(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Int(n) => *n,
        Value::Double(d) if d.is_finite() => d.trunc() as i64,
        _ => return None,
    };
    if n > 0 && n <= i32::MAX as i64 {
        Some(n as u32)
    } else {
        None
    }
}
