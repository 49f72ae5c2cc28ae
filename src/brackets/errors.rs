//! # Bracket Table Errors

use thiserror::Error;

/// Result type for bracket table construction
pub type TableResult<T> = Result<T, TableError>;

/// Errors raised while building a bracket table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// No pairs were supplied
    #[error("Bracket table must contain at least one pair")]
    Empty,

    /// Opener and closer are the same byte
    #[error("Bracket pair uses the same character for both sides: '{0}'")]
    SameCharacter(char),

    /// A byte appears in more than one role or pair
    #[error("Character '{0}' appears more than once in the bracket table")]
    Duplicate(char),

    /// A textual pair was not exactly two ASCII characters
    #[error("Invalid bracket pair '{0}': expected two ASCII characters like \"[]\"")]
    InvalidPair(String),
}
