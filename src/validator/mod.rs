//! Validator state machine for bracketstack
//!
//! Consumes one byte at a time, classifies it through the bracket table
//! and drives the addressable stack. Bracket errors are recovered here
//! and surface only as `Verdict`s; storage errors are returned.
//!
//! ```ignore
//! let mut validator = Validator::new(BracketTable::default(), MemoryStore::new());
//! for byte in b"[{a}]" {
//!     if let Some(verdict) = validator.consume(*byte)? {
//!         println!("{}", verdict);
//!     }
//! }
//! ```

mod machine;
mod verdict;

pub use machine::{Validator, ValidatorState};
pub use verdict::{InvalidReason, Verdict};
