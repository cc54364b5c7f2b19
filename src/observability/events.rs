//! Observable events emitted by the storage layer

use std::fmt;

/// Lifecycle and configuration events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Environment lifecycle
    StartupBegin,
    StartupComplete,
    ShutdownBegin,
    ShutdownComplete,
    EnvOpened,
    EnvClosed,
    HugePagesEnabled,

    // Environment configuration
    CacheSizeSet,
    LockMemorySet,
    LockTimeoutSet,
    RedzoneSet,
    LogFlushPeriodSet,
    CheckpointPeriodSet,
    CleanerPeriodSet,
    CleanerIterationsSet,

    // Durability
    CheckpointBegin,
    CheckpointComplete,
    LogFlushComplete,

    // Dictionaries
    DictionaryOptions,
    DictionaryOpened,
    DictionaryNotFound,
    DictionaryDescriptorSet,
    DictionaryDescriptorMismatch,
    DictionaryRemoved,
    DictionaryRenamed,

    // Diagnostics
    EngineDiagnostic,
    ComparatorFailure,
    FatalError,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StartupBegin => "STORAGE_STARTUP_BEGIN",
            Event::StartupComplete => "STORAGE_STARTUP_COMPLETE",
            Event::ShutdownBegin => "STORAGE_SHUTDOWN_BEGIN",
            Event::ShutdownComplete => "STORAGE_SHUTDOWN_COMPLETE",
            Event::EnvOpened => "ENV_OPENED",
            Event::EnvClosed => "ENV_CLOSED",
            Event::HugePagesEnabled => "HUGE_PAGES_ENABLED",

            Event::CacheSizeSet => "CACHE_SIZE_SET",
            Event::LockMemorySet => "LOCK_MEMORY_SET",
            Event::LockTimeoutSet => "LOCK_TIMEOUT_SET",
            Event::RedzoneSet => "FS_REDZONE_SET",
            Event::LogFlushPeriodSet => "LOG_FLUSH_PERIOD_SET",
            Event::CheckpointPeriodSet => "CHECKPOINT_PERIOD_SET",
            Event::CleanerPeriodSet => "CLEANER_PERIOD_SET",
            Event::CleanerIterationsSet => "CLEANER_ITERATIONS_SET",

            Event::CheckpointBegin => "CHECKPOINT_BEGIN",
            Event::CheckpointComplete => "CHECKPOINT_COMPLETE",
            Event::LogFlushComplete => "LOG_FLUSH_COMPLETE",

            Event::DictionaryOptions => "DICTIONARY_OPTIONS",
            Event::DictionaryOpened => "DICTIONARY_OPENED",
            Event::DictionaryNotFound => "DICTIONARY_NOT_FOUND",
            Event::DictionaryDescriptorSet => "DICTIONARY_DESCRIPTOR_SET",
            Event::DictionaryDescriptorMismatch => "DICTIONARY_DESCRIPTOR_MISMATCH",
            Event::DictionaryRemoved => "DICTIONARY_REMOVED",
            Event::DictionaryRenamed => "DICTIONARY_RENAMED",

            Event::EngineDiagnostic => "ENGINE_DIAGNOSTIC",
            Event::ComparatorFailure => "COMPARATOR_FAILURE",
            Event::FatalError => "FATAL_ERROR",
        }
    }

    /// Returns true if this event is only ever logged before termination
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Event::DictionaryDescriptorMismatch | Event::ComparatorFailure | Event::FatalError
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
