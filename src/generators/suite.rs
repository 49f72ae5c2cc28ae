//! Stream test suite
//!
//! A suite is an ordered list of generated streams. Each case is its own
//! batch and is fully drained before the next one starts, so the
//! validator never sees two cases interleaved.

use serde::{Deserialize, Serialize};

use super::streams::{insufficient_open_brackets, valid_stream, INSUFFICIENT_DEFICIT};
use crate::feed::{BatchWriter, FeedError, FeedSender};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, ObservationScope};

/// One generated stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamCase {
    /// `[{a` × count followed by `}]` × count
    Valid { name: String, count: u64 },
    /// `size - 5` openers followed by `size` closers
    InsufficientOpen { name: String, size: u64 },
}

impl StreamCase {
    /// Case label.
    pub fn name(&self) -> &str {
        match self {
            StreamCase::Valid { name, .. } | StreamCase::InsufficientOpen { name, .. } => name,
        }
    }

    /// Bytes this case will enqueue.
    pub fn expected_bytes(&self) -> u64 {
        match self {
            StreamCase::Valid { count, .. } => count * 5,
            StreamCase::InsufficientOpen { size, .. } => {
                size.saturating_sub(INSUFFICIENT_DEFICIT) + size
            }
        }
    }

    /// Checks the case parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.name().trim().is_empty() {
            return Err("suite case name must not be empty".to_string());
        }
        match self {
            StreamCase::Valid { count, .. } if *count == 0 => {
                Err(format!("suite case '{}': count must be > 0", self.name()))
            }
            StreamCase::InsufficientOpen { size, .. } if *size < INSUFFICIENT_DEFICIT => Err(format!(
                "suite case '{}': size must be >= {}",
                self.name(),
                INSUFFICIENT_DEFICIT
            )),
            _ => Ok(()),
        }
    }

    /// Writes this case into `batch`.
    pub async fn generate(&self, batch: &mut BatchWriter<'_>) -> Result<u64, FeedError> {
        match self {
            StreamCase::Valid { count, .. } => valid_stream(batch, *count).await,
            StreamCase::InsufficientOpen { size, .. } => {
                insufficient_open_brackets(batch, *size).await
            }
        }
    }
}

/// The five streams of the reference run, in order.
pub fn default_suite() -> Vec<StreamCase> {
    vec![
        StreamCase::Valid {
            name: "small-valid".to_string(),
            count: 1,
        },
        StreamCase::Valid {
            name: "valid-over-1mb".to_string(),
            count: 512 * 1024,
        },
        StreamCase::InsufficientOpen {
            name: "insufficient-open".to_string(),
            size: 512,
        },
        StreamCase::Valid {
            name: "another-small-valid".to_string(),
            count: 1024,
        },
        StreamCase::Valid {
            name: "valid-over-256mb".to_string(),
            count: 32 * 1024 * 1024,
        },
    ]
}

/// Per-case result of a suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Case label
    pub name: String,
    /// Batch that carried the case
    pub batch: u64,
    /// Bytes enqueued and acknowledged
    pub bytes: u64,
}

/// Runs `cases` in order, draining each before starting the next.
///
/// # Errors
///
/// Stops at the first case whose batch could not be fed or drained.
pub async fn run_suite(
    sender: &mut FeedSender,
    cases: &[StreamCase],
    metrics: &MetricsRegistry,
) -> Result<Vec<CaseReport>, FeedError> {
    let mut reports = Vec::with_capacity(cases.len());

    for case in cases {
        let mut batch = sender.batch();
        let batch_id = batch.id().to_string();
        let scope = ObservationScope::with_fields(
            "CASE",
            &[("name", case.name()), ("batch", batch_id.as_str())],
        );
        log_event_with_fields(
            Event::BatchBegin,
            &[("batch", batch_id.as_str()), ("name", case.name())],
        );

        let outcome = match case.generate(&mut batch).await {
            Ok(_) => batch.drain().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(summary) => {
                metrics.increment_batches_drained();
                let bytes = summary.enqueued.to_string();
                log_event_with_fields(
                    Event::BatchDrained,
                    &[("batch", batch_id.as_str()), ("bytes", bytes.as_str())],
                );
                scope.complete_with_fields(&[("bytes", bytes.as_str())]);
                reports.push(CaseReport {
                    name: case.name().to_string(),
                    batch: summary.id,
                    bytes: summary.enqueued,
                });
            }
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e);
            }
        }
    }

    let cases_run = reports.len().to_string();
    log_event_with_fields(Event::SuiteComplete, &[("cases", cases_run.as_str())]);
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suite_order() {
        let suite = default_suite();
        let names: Vec<_> = suite.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            [
                "small-valid",
                "valid-over-1mb",
                "insufficient-open",
                "another-small-valid",
                "valid-over-256mb",
            ]
        );
        assert!(suite.iter().all(|c| c.validate().is_ok()));
    }

    #[test]
    fn test_expected_sizes() {
        let valid = StreamCase::Valid {
            name: "v".to_string(),
            count: 512 * 1024,
        };
        // "> 1MB of characters"
        assert!(valid.expected_bytes() > 1024 * 1024);

        let short = StreamCase::InsufficientOpen {
            name: "s".to_string(),
            size: 512,
        };
        assert_eq!(short.expected_bytes(), 507 + 512);
    }

    #[test]
    fn test_validate_rejects_bad_cases() {
        let empty = StreamCase::Valid {
            name: "v".to_string(),
            count: 0,
        };
        assert!(empty.validate().is_err());

        let tiny = StreamCase::InsufficientOpen {
            name: "t".to_string(),
            size: 4,
        };
        assert!(tiny.validate().is_err());

        let unnamed = StreamCase::Valid {
            name: " ".to_string(),
            count: 1,
        };
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_case_json_shape() {
        let case: StreamCase =
            serde_json::from_str(r#"{"kind":"insufficient_open","name":"short","size":9}"#).unwrap();
        assert_eq!(
            case,
            StreamCase::InsufficientOpen {
                name: "short".to_string(),
                size: 9,
            }
        );
    }
}
