//! Consumer task
//!
//! Pulls bytes from the feed one at a time, runs them through the
//! validator and acknowledges each one after it has been processed.
//! The store behind the validator is touched by this task only.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use super::sink::VerdictSink;
use crate::brackets::BracketClass;
use crate::feed::FeedReceiver;
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, Severity};
use crate::stack::{AddressableStore, StackResult};
use crate::validator::{Validator, ValidatorState, Verdict};

/// Why the consumer loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every sender was dropped and the queue was empty
    FeedClosed,
    /// The shutdown signal fired
    Shutdown,
}

impl StopReason {
    fn as_str(&self) -> &'static str {
        match self {
            StopReason::FeedClosed => "feed_closed",
            StopReason::Shutdown => "shutdown",
        }
    }
}

/// Single consumer driving one validator.
pub struct Consumer<S: AddressableStore, K: VerdictSink> {
    validator: Validator<S>,
    sink: K,
    metrics: Arc<MetricsRegistry>,
}

/// What a consumer hands back after a clean stop.
pub struct ConsumerExit<S: AddressableStore, K: VerdictSink> {
    /// Why the loop ended
    pub reason: StopReason,
    /// Validator, including any still-open candidate
    pub validator: Validator<S>,
    /// The sink, with whatever it recorded
    pub sink: K,
}

impl<S: AddressableStore, K: VerdictSink> Consumer<S, K> {
    /// Creates a consumer.
    pub fn new(validator: Validator<S>, sink: K, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            validator,
            sink,
            metrics,
        }
    }

    /// Processes one byte: validate, count, report.
    ///
    /// # Errors
    ///
    /// Storage failures are logged at FATAL and returned.
    pub fn process(&mut self, byte: u8) -> StackResult<Option<Verdict>> {
        self.metrics.increment_bytes_received();
        let class = self.validator.table().classify(byte);

        let verdict = match self.validator.consume(byte) {
            Ok(verdict) => verdict,
            Err(e) => {
                if e.is_fatal() {
                    self.metrics.increment_storage_failures();
                    let error = e.to_string();
                    let depth = self.validator.depth().to_string();
                    log_event_with_fields(
                        Event::StorageFailure,
                        &[("error", error.as_str()), ("depth", depth.as_str())],
                    );
                }
                return Err(e);
            }
        };

        // Stack operations are counted only once the store accepted them
        match class {
            BracketClass::Ignored => self.metrics.increment_bytes_ignored(),
            BracketClass::Opening { .. } => self.metrics.increment_pushes(),
            BracketClass::Closing { .. } => self.metrics.increment_pops(),
        }

        if Logger::enabled(Severity::Trace) {
            let byte_str = (byte as char).to_string();
            let depth = self.validator.depth().to_string();
            Logger::trace(
                Event::ByteConsumed.as_str(),
                &[("byte", byte_str.as_str()), ("depth", depth.as_str())],
            );
        }

        if let Some(verdict) = verdict {
            if verdict.is_valid() {
                self.metrics.increment_valid();
            } else {
                self.metrics.increment_invalid();
            }
            self.sink.record(&verdict);
        }
        Ok(verdict)
    }

    /// Runs until the feed closes or `shutdown` resolves.
    ///
    /// Each byte is acknowledged only after it was processed. On a
    /// storage failure the receiver is dropped, so the failing byte and
    /// everything still queued are abandoned and producers see
    /// `FeedError::Abandoned` / `FeedError::Closed`.
    pub async fn run<F>(mut self, mut feed: FeedReceiver, shutdown: F) -> StackResult<ConsumerExit<S, K>>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        log_event_with_fields(Event::ConsumerStart, &[]);

        let reason = loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break StopReason::Shutdown,

                item = feed.recv() => {
                    let Some(item) = item else {
                        break StopReason::FeedClosed;
                    };
                    let (byte, ack) = item.into_parts();
                    // On error `ack` is dropped uncompleted, abandoning the byte
                    self.process(byte)?;
                    ack.complete();
                }
            }
        };

        feed.close();
        let depth = self.validator.depth().to_string();
        let state = match self.validator.state() {
            ValidatorState::Idle => "idle",
            ValidatorState::Accumulating => "accumulating",
        };
        log_event_with_fields(
            Event::ConsumerStop,
            &[
                ("depth", depth.as_str()),
                ("reason", reason.as_str()),
                ("state", state),
            ],
        );

        Ok(ConsumerExit {
            reason,
            validator: self.validator,
            sink: self.sink,
        })
    }

    /// Borrow the validator.
    pub fn validator(&self) -> &Validator<S> {
        &self.validator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::BracketTable;
    use crate::engine::MemorySink;
    use crate::feed::{channel, FeedError};
    use crate::stack::MemoryStore;
    use crate::validator::InvalidReason;
    use std::io;

    fn consumer() -> Consumer<MemoryStore, MemorySink> {
        Consumer::new(
            Validator::new(BracketTable::default(), MemoryStore::new()),
            MemorySink::new(),
            Arc::new(MetricsRegistry::new()),
        )
    }

    #[test]
    fn test_process_counts_byte_classes() {
        let metrics = Arc::new(MetricsRegistry::new());
        let mut consumer = Consumer::new(
            Validator::new(BracketTable::default(), MemoryStore::new()),
            MemorySink::new(),
            Arc::clone(&metrics),
        );

        for byte in b"[{a}]" {
            consumer.process(*byte).unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.bytes_received, 5);
        assert_eq!(snapshot.bytes_ignored, 1);
        assert_eq!(snapshot.pushes, 2);
        assert_eq!(snapshot.pops, 2);
        assert_eq!(snapshot.valid_streams, 1);
        assert_eq!(snapshot.invalid_streams, 0);
    }

    #[tokio::test]
    async fn test_run_until_feed_closes() {
        let (mut tx, rx) = channel(8).unwrap();
        let task = tokio::spawn(consumer().run(rx, std::future::pending()));

        let mut batch = tx.batch();
        batch.enqueue_all(b"[{a}]]").await.unwrap();
        let summary = batch.drain().await.unwrap();
        assert_eq!(summary.enqueued, 6);
        drop(tx);

        let exit = task.await.unwrap().unwrap();
        assert_eq!(exit.reason, StopReason::FeedClosed);
        assert_eq!(
            exit.sink.verdicts(),
            &[
                Verdict::Valid { total_size: 4 },
                Verdict::Invalid {
                    reason: InvalidReason::UnmatchedClose,
                    position: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_consumer() {
        let (_tx, rx) = channel(8).unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(consumer().run(rx, async move {
            let _ = stop_rx.await;
        }));

        stop_tx.send(()).unwrap();
        let exit = task.await.unwrap().unwrap();
        assert_eq!(exit.reason, StopReason::Shutdown);
        assert_eq!(exit.validator.state(), ValidatorState::Idle);
    }

    #[tokio::test]
    async fn test_open_candidate_survives_batch_boundary() {
        let (mut tx, rx) = channel(8).unwrap();
        let task = tokio::spawn(consumer().run(rx, std::future::pending()));

        let mut batch = tx.batch();
        batch.enqueue_all(b"[[[]").await.unwrap();
        batch.drain().await.unwrap();

        let mut batch = tx.batch();
        batch.enqueue_all(b"]]").await.unwrap();
        batch.drain().await.unwrap();
        drop(tx);

        let exit = task.await.unwrap().unwrap();
        assert_eq!(exit.sink.verdicts(), &[Verdict::Valid { total_size: 6 }]);
    }

    struct ReadOnlyStore;

    impl AddressableStore for ReadOnlyStore {
        fn write_at(&mut self, _offset: u64, _byte: u8) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        fn read_at(&mut self, _offset: u64) -> io::Result<u8> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "empty"))
        }

        fn kind(&self) -> &'static str {
            "read-only"
        }
    }

    #[tokio::test]
    async fn test_storage_failure_stops_consumer_and_abandons_batch() {
        let metrics = Arc::new(MetricsRegistry::new());
        let consumer = Consumer::new(
            Validator::new(BracketTable::default(), ReadOnlyStore),
            MemorySink::new(),
            Arc::clone(&metrics),
        );
        let (mut tx, rx) = channel(8).unwrap();
        let task = tokio::spawn(consumer.run(rx, std::future::pending()));

        let mut batch = tx.batch();
        batch.enqueue_all(b"a[b").await.unwrap();
        let err = batch.drain().await.unwrap_err();
        assert!(matches!(err, FeedError::Abandoned { enqueued: 3, .. }));

        match task.await.unwrap() {
            Err(e) => assert!(e.is_fatal()),
            Ok(_) => panic!("consumer must stop on storage failure"),
        }
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.storage_failures, 1);
        assert_eq!(snapshot.bytes_received, 2);
        assert_eq!(snapshot.bytes_ignored, 1);
        // The failed push of '[' is not counted
        assert_eq!(snapshot.pushes, 0);

        let mut batch = tx.batch();
        assert_eq!(batch.enqueue(b'[').await.unwrap_err(), FeedError::Closed);
    }
}
