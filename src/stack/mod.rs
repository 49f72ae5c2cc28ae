//! Addressable stack subsystem for bracketstack
//!
//! A LIFO whose cells live in a random-access store (a file or a vector)
//! instead of process memory. Only the next free offset is held in RAM.
//!
//! # Design Principles
//!
//! - Point writes and point reads only, never bulk I/O
//! - Offset is the single source of truth for depth
//! - Reset never erases, stale cells are overwritten on demand
//! - Storage failures are fatal
//!
//! # Invariants Enforced
//!
//! - `depth()` equals the number of unmatched opening brackets
//! - store bytes `[0, depth)` are the stack, bottom to top

mod errors;
#[allow(clippy::module_inception)]
mod stack;
mod store;

pub use errors::{Severity, StackError, StackErrorCode, StackResult};
pub use stack::AddressableStack;
pub use store::{AddressableStore, FileStore, MemoryStore};
