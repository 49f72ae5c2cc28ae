//! Stream generators for bracketstack
//!
//! Producers of deterministic bracket streams, a reader-backed source for
//! real input, and the suite runner that feeds them batch by batch.

mod streams;
mod suite;

pub use streams::{insufficient_open_brackets, stream_reader, valid_stream, SourceError, INSUFFICIENT_DEFICIT};
pub use suite::{default_suite, run_suite, CaseReport, StreamCase};
