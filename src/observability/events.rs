//! Observability events for bracketstack
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration loaded
    ConfigLoaded,
    /// Backing store opened
    StoreOpened,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Consumer
    /// Consumer task started
    ConsumerStart,
    /// Consumer task stopped
    ConsumerStop,
    /// A byte was consumed (trace only)
    ByteConsumed,

    // Feed
    /// Producer opened a batch
    BatchBegin,
    /// Every byte of a batch was acknowledged
    BatchDrained,

    // Verdicts
    /// Candidate stream completed successfully
    StreamValid,
    /// Candidate stream rejected
    StreamInvalid,

    // Failures
    /// Backing store failed (FATAL)
    StorageFailure,

    // Suite
    /// Every suite case ran
    SuiteComplete,
    /// Suite done, idling until Ctrl-C
    SuiteWaiting,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BRACKETSTACK_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::ConsumerStart => "CONSUMER_START",
            Event::ConsumerStop => "CONSUMER_STOP",
            Event::ByteConsumed => "BYTE_CONSUMED",

            Event::BatchBegin => "BATCH_BEGIN",
            Event::BatchDrained => "BATCH_DRAINED",

            Event::StreamValid => "STREAM_VALID",
            Event::StreamInvalid => "STREAM_INVALID",

            Event::StorageFailure => "STORAGE_FAILURE",

            Event::SuiteComplete => "SUITE_COMPLETE",
            Event::SuiteWaiting => "SUITE_WAITING",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StorageFailure)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
