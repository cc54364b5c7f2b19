//! Forced-fatal path
//!
//! Used where no safe unwind exists: inside the key comparator, during
//! environment setup and shutdown, and for durability operations. Logs one
//! FATAL line with full context, then terminates with
//! `std::process::abort()`: no unwinding, no destructors, no catching.

use crate::observability::{Event, Logger};

use super::codes::ErrorCode;
use super::status::{EngineResult, EngineStatus};
use super::store_error::StoreError;

/// Log the error and terminate the process
pub fn halt_on(err: &StoreError, operation: &str) -> ! {
    let assertion = err.code().assertion().map(|n| n.to_string()).unwrap_or_default();
    let status = err.status().map(|s| s.to_string()).unwrap_or_default();
    Logger::fatal(
        Event::FatalError.as_str(),
        &[
            ("assertion", assertion.as_str()),
            ("code", err.code().as_str()),
            ("details", err.details().unwrap_or("")),
            ("kind", err.kind().as_str()),
            ("message", err.message()),
            ("operation", operation),
            ("status", status.as_str()),
        ],
    );
    std::process::abort()
}

/// Build an error from a code and message, log it and terminate
pub fn halt(code: ErrorCode, message: &str, operation: &str) -> ! {
    halt_on(&StoreError::new(code, message), operation)
}

/// Terminate unless the engine call succeeded
pub fn check_fatal(result: EngineResult<()>, operation: &str) {
    if let Err(status) = result {
        halt_on(&super::classify(status), operation);
    }
}

/// Terminate on a nonzero raw status, whatever its classification
pub fn check_fatal_code(code: i32, operation: &str) {
    if code != 0 {
        halt_on(&super::classify(EngineStatus::new(code)), operation);
    }
}
