//! Verdict sinks
//!
//! The engine hands every verdict to a sink and forgets it. `LogSink`
//! writes one structured log line per verdict; `MemorySink` keeps them
//! for callers that want to inspect or report them afterwards.

use crate::observability::{Event, Logger};
use crate::validator::Verdict;

/// Receiver of verdict events.
pub trait VerdictSink: Send {
    /// Record one verdict. Must not fail; reporting never stops validation.
    fn record(&mut self, verdict: &Verdict);
}

/// Sink that logs every verdict.
///
/// Valid streams are logged at INFO, invalid ones at WARN.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    /// Create a log sink.
    pub fn new() -> Self {
        Self
    }
}

impl VerdictSink for LogSink {
    fn record(&mut self, verdict: &Verdict) {
        let fields = verdict.fields();
        let field_refs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();

        match verdict {
            Verdict::Valid { .. } => Logger::info(Event::StreamValid.as_str(), &field_refs),
            Verdict::Invalid { .. } => Logger::warn(Event::StreamInvalid.as_str(), &field_refs),
        }
    }
}

/// Sink that collects verdicts in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    verdicts: Vec<Verdict>,
}

impl MemorySink {
    /// Create an empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verdicts recorded so far, in arrival order.
    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    /// Number of verdicts recorded.
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Consume the sink and return its verdicts.
    pub fn into_verdicts(self) -> Vec<Verdict> {
        self.verdicts
    }
}

impl VerdictSink for MemorySink {
    fn record(&mut self, verdict: &Verdict) {
        self.verdicts.push(*verdict);
    }
}

/// Fans a verdict out to two sinks, left first.
impl<A: VerdictSink, B: VerdictSink> VerdictSink for (A, B) {
    fn record(&mut self, verdict: &Verdict) {
        self.0.record(verdict);
        self.1.record(verdict);
    }
}
