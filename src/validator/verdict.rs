//! Verdicts emitted by the validator

use std::fmt;

use serde::Serialize;

/// Why a candidate stream was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvalidReason {
    /// Closing bracket arrived while the stack was empty
    UnmatchedClose,
    /// Closing bracket of the wrong kind
    Mismatch {
        /// Closer required by the opener on top of the stack
        expected: char,
        /// Closer actually received
        found: char,
    },
}

impl InvalidReason {
    /// Stable identifier used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::UnmatchedClose => "UNMATCHED_CLOSE",
            InvalidReason::Mismatch { .. } => "MISMATCH",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::UnmatchedClose => {
                write!(f, "closing bracket with no matching open")
            }
            InvalidReason::Mismatch { expected, found } => {
                write!(
                    f,
                    "mismatched bracket kind: expected '{}', found '{}'",
                    expected, found
                )
            }
        }
    }
}

/// Outcome of a candidate stream.
///
/// A stream that is still open produces no verdict at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Stack returned to empty; `total_size` bracket characters were consumed
    Valid { total_size: u64 },
    /// Candidate rejected at bracket number `position`
    Invalid {
        reason: InvalidReason,
        position: u64,
    },
}

impl Verdict {
    /// Returns true for `Valid`.
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid { .. })
    }

    /// Flattens the verdict into log fields.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Verdict::Valid { total_size } => vec![("total_size", total_size.to_string())],
            Verdict::Invalid { reason, position } => {
                let mut fields = vec![
                    ("position", position.to_string()),
                    ("reason", reason.as_str().to_string()),
                ];
                if let InvalidReason::Mismatch { expected, found } = reason {
                    fields.push(("expected", expected.to_string()));
                    fields.push(("found", found.to_string()));
                }
                fields
            }
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid { total_size } => {
                write!(f, "valid bracket stream ({} brackets)", total_size)
            }
            Verdict::Invalid { reason, position } => {
                write!(f, "invalid bracket stream at bracket {}: {}", position, reason)
            }
        }
    }
}
