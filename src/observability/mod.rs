//! Observability subsystem for bracketstack
//!
//! - Structured logging (JSON)
//! - Counters
//! - Lifecycle event tracing
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on validation
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use bracketstack::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("BATCH_BEGIN", &[("batch", "1")]);
//! log_event_with_fields(Event::StreamValid, &[("total_size", "4")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_LEVEL_ENV};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
///
/// Fatal events go out at FATAL, everything else at INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::BootStart);
        log_event(Event::ShutdownComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("store", "memory")]);
    }
}
