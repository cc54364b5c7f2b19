//! Error codes, outcome kinds and severities
//!
//! Every code belongs to exactly one [`OutcomeKind`]. The kind decides how a
//! caller must react; the severity decides whether the process may continue.

use std::fmt;

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, process continues
    Error,
    /// Process must terminate
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Classification buckets for a failed storage operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// Abort and retry the whole transaction
    UserRetryable,
    /// Rejected before any engine-side mutation
    UserInputInvalid,
    /// A non-creating open found nothing; a normal negative result
    BenignNotFound,
    /// Consistency cannot be guaranteed; the process must terminate
    FatalCorruption,
    /// Configuration, lifecycle or durability failure with no degraded mode
    FatalConfiguration,
}

impl OutcomeKind {
    pub fn severity(&self) -> Severity {
        match self {
            OutcomeKind::UserRetryable
            | OutcomeKind::UserInputInvalid
            | OutcomeKind::BenignNotFound => Severity::Error,
            OutcomeKind::FatalCorruption | OutcomeKind::FatalConfiguration => Severity::Fatal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::UserRetryable => "USER_RETRYABLE",
            OutcomeKind::UserInputInvalid => "USER_INPUT_INVALID",
            OutcomeKind::BenignNotFound => "BENIGN_NOT_FOUND",
            OutcomeKind::FatalCorruption => "FATAL_CORRUPTION",
            OutcomeKind::FatalConfiguration => "FATAL_CONFIGURATION",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage-layer error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Engine conditions the caller retries
    LockNotGranted,
    Deadlock,
    DuplicateKey,
    KeyNotFound,
    DictionaryTooNew,
    HostFailure,

    // Engine conditions that mean corruption
    RecoveryFailed,
    BadFormat,
    BadChecksum,
    NeedsRepair,
    NoHeader,
    UnhandledStatus,

    // Adapter conditions
    InvalidReadPageSize,
    InvalidPageSize,
    InvalidCompression,
    InvalidKeyPattern,
    InvalidSetting,
    DictionaryMissing,
    DictionaryAbsent,
    RenameFailed,
    DescriptorMismatch,
    ComparatorFailure,
    EnvNotOpen,
    EnvLifecycle,
    EngineSetupFailed,
}

impl ErrorCode {
    /// Stable string code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::LockNotGranted => "STRATA_LOCK_NOT_GRANTED",
            ErrorCode::Deadlock => "STRATA_LOCK_DEADLOCK",
            ErrorCode::DuplicateKey => "STRATA_DUPLICATE_KEY",
            ErrorCode::KeyNotFound => "STRATA_KEY_NOT_FOUND",
            ErrorCode::DictionaryTooNew => "STRATA_DICTIONARY_TOO_NEW",
            ErrorCode::HostFailure => "STRATA_HOST_FAILURE",
            ErrorCode::RecoveryFailed => "STRATA_RECOVERY_FAILED",
            ErrorCode::BadFormat => "STRATA_BAD_FORMAT",
            ErrorCode::BadChecksum => "STRATA_BAD_CHECKSUM",
            ErrorCode::NeedsRepair => "STRATA_NEEDS_REPAIR",
            ErrorCode::NoHeader => "STRATA_NO_HEADER",
            ErrorCode::UnhandledStatus => "STRATA_UNHANDLED_STATUS",
            ErrorCode::InvalidReadPageSize => "STRATA_INVALID_READ_PAGE_SIZE",
            ErrorCode::InvalidPageSize => "STRATA_INVALID_PAGE_SIZE",
            ErrorCode::InvalidCompression => "STRATA_INVALID_COMPRESSION",
            ErrorCode::InvalidKeyPattern => "STRATA_INVALID_KEY_PATTERN",
            ErrorCode::InvalidSetting => "STRATA_INVALID_SETTING",
            ErrorCode::DictionaryMissing => "STRATA_DICTIONARY_MISSING",
            ErrorCode::DictionaryAbsent => "STRATA_DICTIONARY_ABSENT",
            ErrorCode::RenameFailed => "STRATA_RENAME_FAILED",
            ErrorCode::DescriptorMismatch => "STRATA_DESCRIPTOR_MISMATCH",
            ErrorCode::ComparatorFailure => "STRATA_COMPARATOR_FAILURE",
            ErrorCode::EnvNotOpen => "STRATA_ENV_NOT_OPEN",
            ErrorCode::EnvLifecycle => "STRATA_ENV_LIFECYCLE",
            ErrorCode::EngineSetupFailed => "STRATA_ENGINE_SETUP_FAILED",
        }
    }

    /// Numeric assertion code, where one has been assigned
    pub fn assertion(&self) -> Option<u32> {
        let n = match self {
            ErrorCode::LockNotGranted => 16759,
            ErrorCode::Deadlock => 16760,
            ErrorCode::KeyNotFound => 16761,
            ErrorCode::RecoveryFailed => 16762,
            ErrorCode::BadFormat => 16763,
            ErrorCode::BadChecksum => 16764,
            ErrorCode::NeedsRepair => 16765,
            ErrorCode::NoHeader => 16766,
            ErrorCode::UnhandledStatus => 16767,
            ErrorCode::DictionaryTooNew => 16768,
            ErrorCode::DuplicateKey => 16769,
            ErrorCode::HostFailure => 16770,
            ErrorCode::InvalidReadPageSize => 16743,
            ErrorCode::InvalidPageSize => 16445,
            ErrorCode::InvalidCompression => 16442,
            ErrorCode::DictionaryMissing => 16444,
            ErrorCode::RenameFailed => 16463,
            ErrorCode::ComparatorFailure => 16455,
            ErrorCode::InvalidKeyPattern
            | ErrorCode::InvalidSetting
            | ErrorCode::DictionaryAbsent
            | ErrorCode::DescriptorMismatch
            | ErrorCode::EnvNotOpen
            | ErrorCode::EnvLifecycle
            | ErrorCode::EngineSetupFailed => return None,
        };
        Some(n)
    }

    /// The outcome bucket this code belongs to
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ErrorCode::LockNotGranted
            | ErrorCode::Deadlock
            | ErrorCode::DuplicateKey
            | ErrorCode::KeyNotFound
            | ErrorCode::DictionaryTooNew
            | ErrorCode::HostFailure => OutcomeKind::UserRetryable,

            ErrorCode::InvalidReadPageSize
            | ErrorCode::InvalidPageSize
            | ErrorCode::InvalidCompression
            | ErrorCode::InvalidKeyPattern
            | ErrorCode::InvalidSetting
            | ErrorCode::DictionaryMissing => OutcomeKind::UserInputInvalid,

            ErrorCode::DictionaryAbsent => OutcomeKind::BenignNotFound,

            ErrorCode::RecoveryFailed
            | ErrorCode::BadFormat
            | ErrorCode::BadChecksum
            | ErrorCode::NeedsRepair
            | ErrorCode::NoHeader
            | ErrorCode::UnhandledStatus
            | ErrorCode::DescriptorMismatch
            | ErrorCode::ComparatorFailure => OutcomeKind::FatalCorruption,

            ErrorCode::RenameFailed
            | ErrorCode::EnvNotOpen
            | ErrorCode::EnvLifecycle
            | ErrorCode::EngineSetupFailed => OutcomeKind::FatalConfiguration,
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind().severity()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCode; 25] = [
        ErrorCode::LockNotGranted,
        ErrorCode::Deadlock,
        ErrorCode::DuplicateKey,
        ErrorCode::KeyNotFound,
        ErrorCode::DictionaryTooNew,
        ErrorCode::HostFailure,
        ErrorCode::RecoveryFailed,
        ErrorCode::BadFormat,
        ErrorCode::BadChecksum,
        ErrorCode::NeedsRepair,
        ErrorCode::NoHeader,
        ErrorCode::UnhandledStatus,
        ErrorCode::InvalidReadPageSize,
        ErrorCode::InvalidPageSize,
        ErrorCode::InvalidCompression,
        ErrorCode::InvalidKeyPattern,
        ErrorCode::InvalidSetting,
        ErrorCode::DictionaryMissing,
        ErrorCode::DictionaryAbsent,
        ErrorCode::RenameFailed,
        ErrorCode::DescriptorMismatch,
        ErrorCode::ComparatorFailure,
        ErrorCode::EnvNotOpen,
        ErrorCode::EnvLifecycle,
        ErrorCode::EngineSetupFailed,
    ];

    #[test]
    fn test_codes_have_strata_prefix() {
        for code in ALL {
            assert!(code.as_str().starts_with("STRATA_"), "{}", code);
        }
    }

    #[test]
    fn test_assertion_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in ALL {
            if let Some(n) = code.assertion() {
                assert!(seen.insert(n), "duplicate assertion code {}", n);
            }
        }
    }

    #[test]
    fn test_fatal_kinds_have_fatal_severity() {
        for code in ALL {
            let fatal = matches!(
                code.kind(),
                OutcomeKind::FatalCorruption | OutcomeKind::FatalConfiguration
            );
            assert_eq!(fatal, code.severity() == Severity::Fatal, "{}", code);
        }
    }
}
