//! Classification of engine status codes
//!
//! This is the catchable path: the classified error is returned to the
//! caller, which decides what to do with it. Call sites that cannot unwind
//! use [`super::fatal`] instead.

use std::io;

use super::codes::ErrorCode;
use super::status::{self, EngineResult, EngineStatus};
use super::store_error::{StoreError, StoreResult};

/// Map a nonzero engine status to its classified error.
///
/// Strictly positive statuses are host failures. Unknown negative statuses
/// classify as `UnhandledStatus`, which is fatal.
pub fn classify(status: EngineStatus) -> StoreError {
    let code = status.code();
    if code > 0 {
        let host = io::Error::from_raw_os_error(code);
        return StoreError::new(
            ErrorCode::HostFailure,
            format!(
                "Got generic error {} ({}) from the engine layer. You may have hit a bug. \
                 Check the error log for more details.",
                code, host
            ),
        )
        .with_status(status);
    }

    let (error_code, message) = match code {
        status::LOCK_NOT_GRANTED => (
            ErrorCode::LockNotGranted,
            "Lock not granted. Try restarting the transaction.",
        ),
        status::LOCK_DEADLOCK => (
            ErrorCode::Deadlock,
            "Deadlock detected during lock acquisition. Try restarting the transaction.",
        ),
        status::KEY_EXISTS => (ErrorCode::DuplicateKey, "Duplicate key error."),
        status::NOT_FOUND => (ErrorCode::KeyNotFound, "Index key not found."),
        status::RUN_RECOVERY => (
            ErrorCode::RecoveryFailed,
            "Automatic environment recovery failed. There may be data corruption.",
        ),
        status::BAD_FORMAT => (
            ErrorCode::BadFormat,
            "File-format error when reading dictionary from disk. There may be data corruption.",
        ),
        status::BAD_CHECKSUM => (
            ErrorCode::BadChecksum,
            "Checksum mismatch when reading dictionary from disk. There may be data corruption.",
        ),
        status::NEEDS_REPAIR => (
            ErrorCode::NeedsRepair,
            "Repair requested when reading dictionary from disk. There may be data corruption.",
        ),
        status::DICTIONARY_NO_HEADER => (
            ErrorCode::NoHeader,
            "No header found when reading dictionary from disk. There may be data corruption.",
        ),
        status::MVCC_DICTIONARY_TOO_NEW => (
            ErrorCode::DictionaryTooNew,
            "Accessed dictionary created after this transaction began. Try restarting the transaction.",
        ),
        _ => {
            return StoreError::new(
                ErrorCode::UnhandledStatus,
                format!("Unhandled engine error: {}", code),
            )
            .with_status(status)
        }
    };

    StoreError::new(error_code, message).with_status(status)
}

/// Classify the status of a dictionary open.
///
/// A missing dictionary on a non-creating open is the benign
/// `DictionaryAbsent`; everything else classifies as usual.
pub fn classify_open(status: EngineStatus, may_create: bool) -> StoreError {
    if status.code() == status::ENOENT && !may_create {
        return StoreError::new(ErrorCode::DictionaryAbsent, "dictionary does not exist")
            .with_status(status);
    }
    classify(status)
}

/// Map a raw status to `Ok(())` or its classified error
pub fn check(code: i32) -> StoreResult<()> {
    if code == status::SUCCESS {
        Ok(())
    } else {
        Err(classify(EngineStatus::new(code)))
    }
}

/// Catchable and forced-fatal handling of engine results
pub trait EngineResultExt<T> {
    /// Classify a failure and return it to the caller
    fn or_classify(self) -> StoreResult<T>;

    /// Classify a failure, log it and terminate the process.
    ///
    /// `operation` names the engine call for the diagnostic.
    fn or_halt(self, operation: &str) -> T;
}

impl<T> EngineResultExt<T> for EngineResult<T> {
    fn or_classify(self) -> StoreResult<T> {
        self.map_err(classify)
    }

    fn or_halt(self, operation: &str) -> T {
        match self {
            Ok(value) => value,
            Err(status) => super::fatal::halt_on(&classify(status), operation),
        }
    }
}
