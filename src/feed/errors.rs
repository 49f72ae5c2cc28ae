//! # Feed Errors

use thiserror::Error;

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Feed channel errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Consumer is gone; nothing more can be enqueued
    #[error("Feed closed: consumer is no longer receiving")]
    Closed,

    /// Some bytes of a batch were dropped without being processed
    #[error("Batch abandoned: {unacknowledged} of {enqueued} bytes were never processed")]
    Abandoned {
        /// Bytes enqueued in the batch
        enqueued: u64,
        /// Bytes whose acknowledgment was dropped
        unacknowledged: u64,
    },

    /// Channel capacity must be positive
    #[error("Invalid feed capacity: {0}")]
    InvalidCapacity(usize),
}
