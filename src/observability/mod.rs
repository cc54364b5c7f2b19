//! Observability for the storage layer
//!
//! - Structured JSON logging, one event per line
//! - Typed lifecycle events
//! - Begin/complete scopes around administrative work
//!
//! ```ignore
//! use strata::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::CacheSizeSet, &[("gigabytes", "4"), ("bytes", "0")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Log a lifecycle event at INFO (FATAL for fatal events)
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields at INFO (FATAL for fatal events)
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Log a configuration event at TRACE.
///
/// Configuration detail is only written when verbose logging is enabled.
pub fn trace_event(event: Event, fields: &[(&str, &str)]) {
    Logger::trace(event.as_str(), fields);
}
