//! Per-byte validation state machine
//!
//! The machine never terminates: after a verdict it is back at `Idle`
//! and the very next bracket starts a new candidate stream.

use serde::Serialize;

use super::verdict::{InvalidReason, Verdict};
use crate::brackets::{BracketClass, BracketTable};
use crate::stack::{AddressableStack, AddressableStore, StackError, StackResult};

/// Phase of the current candidate stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorState {
    /// No unmatched openers, nothing counted
    Idle,
    /// At least one unmatched opener on the stack
    Accumulating,
}

/// Streaming bracket validator.
pub struct Validator<S: AddressableStore> {
    table: BracketTable,
    stack: AddressableStack<S>,
    /// Bracket characters consumed since the last reset
    total_size: u64,
    /// Set after a storage failure; no further input is accepted
    halted: bool,
}

impl<S: AddressableStore> Validator<S> {
    /// Creates a validator over `store` using `table`.
    pub fn new(table: BracketTable, store: S) -> Self {
        Self {
            table,
            stack: AddressableStack::new(store),
            total_size: 0,
            halted: false,
        }
    }

    /// Consumes one byte.
    ///
    /// Returns `Ok(Some(verdict))` when the byte completes or breaks the
    /// current candidate, `Ok(None)` otherwise. Bracket errors are
    /// verdicts, not `Err`s.
    ///
    /// # Errors
    ///
    /// Storage failures are returned and poison the validator; every
    /// later call fails with `BRACE_VALIDATOR_HALTED`.
    pub fn consume(&mut self, byte: u8) -> StackResult<Option<Verdict>> {
        if self.halted {
            return Err(StackError::halted());
        }

        let result = self.step(byte);
        if matches!(&result, Err(e) if e.is_fatal()) {
            self.halted = true;
        }
        result
    }

    fn step(&mut self, byte: u8) -> StackResult<Option<Verdict>> {
        match self.table.classify(byte) {
            BracketClass::Ignored => Ok(None),
            BracketClass::Opening { .. } => {
                self.stack.push(byte)?;
                self.total_size += 1;
                Ok(None)
            }
            BracketClass::Closing { .. } => {
                self.total_size += 1;
                let opener = match self.stack.pop() {
                    Ok(opener) => opener,
                    Err(e) if e.is_empty_stack() => {
                        return Ok(Some(self.reject(InvalidReason::UnmatchedClose)));
                    }
                    Err(e) => return Err(e),
                };

                match self.table.closer_for(opener) {
                    Some(expected) if expected == byte => {}
                    // The store only ever holds openers, so a non-opener here
                    // means the cell was clobbered; report it as a mismatch.
                    expected => {
                        let reason = InvalidReason::Mismatch {
                            expected: expected.unwrap_or(opener) as char,
                            found: byte as char,
                        };
                        return Ok(Some(self.reject(reason)));
                    }
                }

                if self.stack.is_empty() {
                    let verdict = Verdict::Valid {
                        total_size: self.total_size,
                    };
                    self.total_size = 0;
                    return Ok(Some(verdict));
                }
                Ok(None)
            }
        }
    }

    /// Builds an `Invalid` verdict and forces the machine back to `Idle`.
    fn reject(&mut self, reason: InvalidReason) -> Verdict {
        let verdict = Verdict::Invalid {
            reason,
            position: self.total_size,
        };
        self.total_size = 0;
        self.stack.reset();
        verdict
    }

    /// Current phase.
    pub fn state(&self) -> ValidatorState {
        if self.stack.is_empty() {
            ValidatorState::Idle
        } else {
            ValidatorState::Accumulating
        }
    }

    /// Number of unmatched openers.
    pub fn depth(&self) -> u64 {
        self.stack.depth()
    }

    /// Bracket characters consumed in the current candidate.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Whether a storage failure has stopped this validator.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The alphabet in use.
    pub fn table(&self) -> &BracketTable {
        &self.table
    }

    /// Reads the unmatched openers, bottom to top.
    pub fn open_brackets(&mut self) -> StackResult<Vec<u8>> {
        self.stack.contents()
    }
}
