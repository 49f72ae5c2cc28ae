//! Feed channel for bracketstack
//!
//! Bounded, ordered, single-producer/single-consumer conduit carrying
//! bytes from generators to the validator.
//!
//! - Producers suspend when the buffer is full (backpressure)
//! - The consumer suspends when it is empty
//! - Delivery is strictly FIFO
//! - Each byte is acknowledged exactly once; batches drain on a
//!   per-batch counting barrier

mod channel;
mod errors;

pub use channel::{channel, Ack, BatchSummary, BatchWriter, FeedItem, FeedReceiver, FeedSender, DEFAULT_CAPACITY};
pub use errors::{FeedError, FeedResult};
