//! bracketstack - streaming bracket validation over a storage-backed stack
//!
//! Bytes are fed through a bounded channel to a single consumer that runs
//! a bracket-matching state machine. The stack of open brackets lives in
//! a byte-addressable store (a file by default), so nesting depth is not
//! bounded by memory.

pub mod brackets;
pub mod cli;
pub mod engine;
pub mod feed;
pub mod generators;
pub mod observability;
pub mod stack;
pub mod validator;
