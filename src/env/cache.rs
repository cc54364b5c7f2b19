//! Cache and lock-tree sizing

use std::fs;

use crate::errors::{ErrorCode, StoreError, StoreResult};

const GIGABYTE: u64 = 1 << 30;

/// Host memory limits used to size the cache
pub trait MemoryProbe {
    /// Physical memory in bytes, if known
    fn physical_memory(&self) -> Option<u64>;

    /// Soft limit on the process data segment in bytes, if limited
    fn max_data_size(&self) -> Option<u64>;
}

/// Reads `/proc/meminfo` and `/proc/self/limits`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl MemoryProbe for SystemProbe {
    fn physical_memory(&self) -> Option<u64> {
        fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|s| parse_meminfo(&s))
    }

    fn max_data_size(&self) -> Option<u64> {
        fs::read_to_string("/proc/self/limits")
            .ok()
            .and_then(|s| parse_limits(&s))
    }
}

/// Fixed values, for tools and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
    pub physical: Option<u64>,
    pub max_data: Option<u64>,
}

impl MemoryProbe for FixedProbe {
    fn physical_memory(&self) -> Option<u64> {
        self.physical
    }

    fn max_data_size(&self) -> Option<u64> {
        self.max_data
    }
}

/// `MemTotal` in bytes
fn parse_meminfo(meminfo: &str) -> Option<u64> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let mut parts = line["MemTotal:".len()..].split_whitespace();
    let value: u64 = parts.next()?.parse().ok()?;
    match parts.next() {
        Some("kB") => value.checked_mul(1024),
        None => Some(value),
        Some(_) => None,
    }
}

/// Soft "Max data size" in bytes; `None` when unlimited
fn parse_limits(limits: &str) -> Option<u64> {
    let line = limits.lines().find(|l| l.starts_with("Max data size"))?;
    line.split_whitespace().nth(3)?.parse().ok()
}

/// Resolve the cache size in bytes.
///
/// A nonzero `configured` value wins. Otherwise half of physical memory,
/// capped at an eighth of the data-segment limit when there is one.
pub fn resolve_cache_size(configured: u64, probe: &dyn MemoryProbe) -> StoreResult<u64> {
    if configured > 0 {
        return Ok(configured);
    }
    let physical = probe.physical_memory().ok_or_else(|| {
        StoreError::new(
            ErrorCode::EngineSetupFailed,
            "cannot determine physical memory; set cache_size explicitly",
        )
    })?;
    let mut cache_size = physical / 2;
    if let Some(max_data) = probe.max_data_size() {
        cache_size = cache_size.min(max_data / 8);
    }
    Ok(cache_size)
}

/// Cache size in the engine's two-part form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSplit {
    pub gigabytes: u32,
    pub bytes: u32,
}

impl CacheSplit {
    pub fn total(&self) -> u64 {
        self.gigabytes as u64 * GIGABYTE + self.bytes as u64
    }
}

pub fn split_cache_size(cache_size: u64) -> CacheSplit {
    CacheSplit {
        gigabytes: u32::try_from(cache_size >> 30).unwrap_or(u32::MAX),
        bytes: (cache_size % GIGABYTE) as u32,
    }
}

/// Lock-tree memory budget: a tenth of the cache
pub fn lock_memory_for(cache_size: u64) -> u64 {
    cache_size / 10
}
