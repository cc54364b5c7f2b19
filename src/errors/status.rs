//! Engine status codes
//!
//! The engine reports every failure as a signed integer status. Zero is
//! success, strictly positive values are host errno values, and the named
//! negative values below are engine conditions.

use std::fmt;

/// Success
pub const SUCCESS: i32 = 0;
/// Host "no such file or directory"; a non-creating open of a missing dictionary
pub const ENOENT: i32 = 2;

/// Row lock could not be granted within the lock-wait timeout
pub const LOCK_NOT_GRANTED: i32 = -30994;
/// Deadlock detected during lock acquisition
pub const LOCK_DEADLOCK: i32 = -30995;
/// Unique key already present
pub const KEY_EXISTS: i32 = -30996;
/// Key not found
pub const NOT_FOUND: i32 = -30989;
/// Automatic environment recovery failed
pub const RUN_RECOVERY: i32 = -30975;
/// On-disk file format not understood
pub const BAD_FORMAT: i32 = -30500;
/// Dictionary file has no header
pub const DICTIONARY_NO_HEADER: i32 = -100006;
/// Dictionary was created after the reading transaction began
pub const MVCC_DICTIONARY_TOO_NEW: i32 = -100010;
/// Dictionary requests repair
pub const NEEDS_REPAIR: i32 = -100013;
/// Block checksum mismatch
pub const BAD_CHECKSUM: i32 = -100015;
/// Transparent huge pages are enabled on the host
pub const HUGE_PAGES_ENABLED: i32 = -100016;

/// A nonzero status returned by an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineStatus(i32);

impl EngineStatus {
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// The raw status code
    pub const fn code(&self) -> i32 {
        self.0
    }

    /// Strictly positive codes are host errno values
    pub const fn is_host_error(&self) -> bool {
        self.0 > 0
    }

    /// Symbolic name for known codes
    pub fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            SUCCESS => "SUCCESS",
            LOCK_NOT_GRANTED => "LOCK_NOT_GRANTED",
            LOCK_DEADLOCK => "LOCK_DEADLOCK",
            KEY_EXISTS => "KEY_EXISTS",
            NOT_FOUND => "NOT_FOUND",
            RUN_RECOVERY => "RUN_RECOVERY",
            BAD_FORMAT => "BAD_FORMAT",
            DICTIONARY_NO_HEADER => "DICTIONARY_NO_HEADER",
            MVCC_DICTIONARY_TOO_NEW => "MVCC_DICTIONARY_TOO_NEW",
            NEEDS_REPAIR => "NEEDS_REPAIR",
            BAD_CHECKSUM => "BAD_CHECKSUM",
            HUGE_PAGES_ENABLED => "HUGE_PAGES_ENABLED",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Result of an engine call
pub type EngineResult<T> = Result<T, EngineStatus>;
