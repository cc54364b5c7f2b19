//! Storage-layer error type

use std::fmt;

use super::codes::{ErrorCode, OutcomeKind, Severity};
use super::status::EngineStatus;

/// A classified storage failure.
///
/// Carries the code, the engine status that produced it (if any), a
/// human-readable message and optional context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    code: ErrorCode,
    status: Option<EngineStatus>,
    message: String,
    details: Option<String>,
}

impl StoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: None,
            message: message.into(),
            details: None,
        }
    }

    /// Attach the engine status that produced this error
    pub fn with_status(mut self, status: EngineStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach context, e.g. the dictionary name
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn invalid_read_page_size(value: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidReadPageSize, "readPageSize must be a number > 0.")
            .with_details(format!("readPageSize: {}", value))
    }

    pub fn invalid_page_size(value: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidPageSize, "pageSize must be a number > 0.")
            .with_details(format!("pageSize: {}", value))
    }

    pub fn invalid_compression(value: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidCompression,
            "compression must be one of: lzma, quicklz, zlib, none.",
        )
        .with_details(format!("compression: {}", value))
    }

    pub fn invalid_key_pattern(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidKeyPattern, reason)
    }

    pub fn invalid_setting(name: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidSetting, format!("{} {}", name, reason))
    }

    pub fn env_not_open(operation: &str) -> Self {
        Self::new(ErrorCode::EnvNotOpen, "storage environment is not open")
            .with_details(format!("operation: {}", operation))
    }

    pub fn env_lifecycle(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EnvLifecycle, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn kind(&self) -> OutcomeKind {
        self.code.kind()
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn status(&self) -> Option<EngineStatus> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Whether the caller should abort and retry its transaction
    pub fn is_retryable(&self) -> bool {
        self.kind() == OutcomeKind::UserRetryable
    }

    /// Whether the process must terminate
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity(), self.code)?;
        if let Some(n) = self.code.assertion() {
            write!(f, " ({})", n)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(status) = self.status {
            write!(f, " [engine status {}]", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
