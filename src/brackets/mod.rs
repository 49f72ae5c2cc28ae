//! Bracket table for bracketstack
//!
//! Maps opening brackets to their closers and back. The table is an
//! immutable value handed to each validator at construction, so two
//! validators can run different alphabets side by side.
//!
//! # Invariants
//!
//! - Both directions of the mapping are bijective
//! - A byte is at most one of: opener, closer
//! - Bytes outside the alphabet classify as `Ignored`

mod errors;
mod table;

pub use errors::{TableError, TableResult};
pub use table::{BracketClass, BracketTable, DEFAULT_PAIRS};
