//! Bounded byte feed with per-byte acknowledgment
//!
//! Every byte travels with an `Ack` owned by whoever holds the item. The
//! consumer calls `Ack::complete` once the byte has been processed; an
//! `Ack` dropped any other way counts as abandoned. Because `complete`
//! takes the token by value, a byte can never be acknowledged twice.
//!
//! Producers enqueue through a `BatchWriter`. `BatchWriter::drain`
//! resolves once every byte of that batch has been acknowledged, which
//! is what keeps consecutive test streams from interleaving.

use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};

use super::errors::{FeedError, FeedResult};

/// Default channel capacity (64K bytes in flight).
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Creates a bounded feed.
///
/// # Errors
///
/// Returns `FeedError::InvalidCapacity` when `capacity` is zero.
pub fn channel(capacity: usize) -> FeedResult<(FeedSender, FeedReceiver)> {
    if capacity == 0 {
        return Err(FeedError::InvalidCapacity(capacity));
    }
    let (tx, rx) = mpsc::channel(capacity);
    Ok((
        FeedSender {
            tx,
            next_batch: 1,
        },
        FeedReceiver { rx },
    ))
}

/// Counting barrier shared by one batch and its in-flight acks.
#[derive(Debug, Default)]
struct BatchState {
    pending: AtomicU64,
    abandoned: AtomicU64,
    drained: Notify,
}

/// Acknowledgment token for a single byte.
#[derive(Debug)]
#[must_use = "dropping an Ack without completing it abandons the byte"]
pub struct Ack {
    state: Arc<BatchState>,
    completed: bool,
}

impl Ack {
    fn new(state: Arc<BatchState>) -> Self {
        state.pending.fetch_add(1, Ordering::AcqRel);
        Self {
            state,
            completed: false,
        }
    }

    /// Marks the byte as processed.
    pub fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for Ack {
    fn drop(&mut self) {
        if !self.completed {
            self.state.abandoned.fetch_add(1, Ordering::AcqRel);
        }
        if self.state.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.state.drained.notify_waiters();
        }
    }
}

/// One byte in flight, with its acknowledgment.
#[derive(Debug)]
pub struct FeedItem {
    byte: u8,
    ack: Ack,
}

impl FeedItem {
    /// Splits the item so the ack can be completed after processing.
    pub fn into_parts(self) -> (u8, Ack) {
        (self.byte, self.ack)
    }
}

/// Producer half of the feed.
#[derive(Debug)]
pub struct FeedSender {
    tx: mpsc::Sender<FeedItem>,
    next_batch: u64,
}

impl FeedSender {
    /// Opens a new batch.
    ///
    /// The batch borrows the sender mutably, so only one batch can be
    /// open at a time.
    pub fn batch(&mut self) -> BatchWriter<'_> {
        let id = self.next_batch;
        self.next_batch += 1;
        BatchWriter {
            id,
            tx: &self.tx,
            state: Arc::new(BatchState::default()),
            enqueued: 0,
        }
    }

    /// True once the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Writer for one batch of bytes.
#[derive(Debug)]
pub struct BatchWriter<'a> {
    id: u64,
    tx: &'a mpsc::Sender<FeedItem>,
    state: Arc<BatchState>,
    enqueued: u64,
}

/// Result of a fully drained batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Batch sequence number, starting at 1
    pub id: u64,
    /// Bytes enqueued and acknowledged
    pub enqueued: u64,
}

impl<'a> BatchWriter<'a> {
    /// Enqueues one byte, waiting while the channel is full.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Closed` if the consumer is gone.
    pub async fn enqueue(&mut self, byte: u8) -> FeedResult<()> {
        self.enqueued += 1;
        let item = FeedItem {
            byte,
            ack: Ack::new(Arc::clone(&self.state)),
        };
        self.tx.send(item).await.map_err(|_| FeedError::Closed)
    }

    /// Enqueues every byte of `bytes` in order.
    pub async fn enqueue_all(&mut self, bytes: &[u8]) -> FeedResult<()> {
        for &byte in bytes {
            self.enqueue(byte).await?;
        }
        Ok(())
    }

    /// Batch sequence number.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Bytes enqueued so far.
    pub fn enqueued(&self) -> u64 {
        self.enqueued
    }

    /// Bytes enqueued but not yet acknowledged.
    pub fn pending(&self) -> u64 {
        self.state.pending.load(Ordering::Acquire)
    }

    /// Waits until every enqueued byte has been acknowledged.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Abandoned` if any ack was dropped without
    /// being completed (the consumer stopped mid-batch).
    pub async fn drain(self) -> FeedResult<BatchSummary> {
        loop {
            let mut notified = pin!(self.state.drained.notified());
            notified.as_mut().enable();
            if self.state.pending.load(Ordering::Acquire) == 0 {
                break;
            }
            notified.await;
        }

        let abandoned = self.state.abandoned.load(Ordering::Acquire);
        if abandoned > 0 {
            return Err(FeedError::Abandoned {
                enqueued: self.enqueued,
                unacknowledged: abandoned,
            });
        }

        Ok(BatchSummary {
            id: self.id,
            enqueued: self.enqueued,
        })
    }
}

/// Consumer half of the feed.
#[derive(Debug)]
pub struct FeedReceiver {
    rx: mpsc::Receiver<FeedItem>,
}

impl FeedReceiver {
    /// Receives the next byte, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<FeedItem> {
        self.rx.recv().await
    }

    /// Stops accepting new bytes. Items already queued can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            channel(0).unwrap_err(),
            FeedError::InvalidCapacity(0)
        );
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (mut tx, mut rx) = channel(16).unwrap();
        let mut batch = tx.batch();
        batch.enqueue_all(b"[{a}]").await.unwrap();

        let mut received = Vec::new();
        for _ in 0..5 {
            let (byte, ack) = rx.recv().await.unwrap().into_parts();
            received.push(byte);
            ack.complete();
        }

        assert_eq!(received, b"[{a}]");
        let summary = batch.drain().await.unwrap();
        assert_eq!(summary.enqueued, 5);
        assert_eq!(summary.id, 1);
    }

    #[tokio::test]
    async fn test_drain_waits_for_acks() {
        let (mut tx, mut rx) = channel(8).unwrap();
        let mut batch = tx.batch();
        batch.enqueue_all(b"[]").await.unwrap();
        assert_eq!(batch.pending(), 2);

        let consumer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            while let Some(item) = rx.recv().await {
                let (_, ack) = item.into_parts();
                ack.complete();
            }
        });

        let summary = batch.drain().await.unwrap();
        assert_eq!(summary.enqueued, 2);

        drop(tx);
        consumer.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_batch_drains_immediately() {
        let (mut tx, _rx) = channel(4).unwrap();
        let summary = tx.batch().drain().await.unwrap();
        assert_eq!(summary.enqueued, 0);
    }

    #[tokio::test]
    async fn test_backpressure_blocks_when_full() {
        let (mut tx, mut rx) = channel(2).unwrap();
        let mut batch = tx.batch();
        batch.enqueue(b'[').await.unwrap();
        batch.enqueue(b'[').await.unwrap();

        let third = tokio::time::timeout(Duration::from_millis(20), batch.enqueue(b']')).await;
        assert!(third.is_err(), "enqueue must wait while the channel is full");

        let (_, ack) = rx.recv().await.unwrap().into_parts();
        ack.complete();
        batch.enqueue(b']').await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_ack_abandons_batch() {
        let (mut tx, mut rx) = channel(4).unwrap();
        let mut batch = tx.batch();
        batch.enqueue_all(b"[[").await.unwrap();

        let (_, ack) = rx.recv().await.unwrap().into_parts();
        ack.complete();
        drop(rx);

        assert_eq!(
            batch.drain().await.unwrap_err(),
            FeedError::Abandoned {
                enqueued: 2,
                unacknowledged: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_enqueue_after_consumer_gone() {
        let (mut tx, rx) = channel(4).unwrap();
        drop(rx);
        assert!(tx.is_closed());

        let mut batch = tx.batch();
        assert_eq!(batch.enqueue(b'[').await.unwrap_err(), FeedError::Closed);
    }

    #[tokio::test]
    async fn test_batch_ids_increase() {
        let (mut tx, _rx) = channel(4).unwrap();
        assert_eq!(tx.batch().id(), 1);
        assert_eq!(tx.batch().id(), 2);
    }
}
