//! Validation engine for bracketstack
//!
//! Wires the feed receiver to a validator and a verdict sink. There is
//! exactly one consumer per validator and it owns the backing store
//! outright, so no locking is involved.

mod consumer;
mod sink;

pub use consumer::{Consumer, ConsumerExit, StopReason};
pub use sink::{LogSink, MemorySink, VerdictSink};
