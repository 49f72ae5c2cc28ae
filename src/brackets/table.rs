//! Opening/closing lookup table
//!
//! Classification is a single index into a 256-entry array, so it is
//! total over `u8` and never fails.

use std::fmt;

use super::errors::{TableError, TableResult};

/// Pairs used when no alphabet is configured.
pub const DEFAULT_PAIRS: [(u8, u8); 3] = [(b'{', b'}'), (b'[', b']'), (b'(', b')')];

/// Classification of a single input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketClass {
    /// Opening bracket; carries the closer that matches it
    Opening { closer: u8 },
    /// Closing bracket; carries the opener that matches it
    Closing { opener: u8 },
    /// Not part of the alphabet
    Ignored,
}

/// Immutable bracket alphabet.
#[derive(Clone, PartialEq, Eq)]
pub struct BracketTable {
    classes: [BracketClass; 256],
    pairs: Vec<(u8, u8)>,
}

impl BracketTable {
    /// Builds a table from `(opener, closer)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the list is empty, a pair reuses one byte
    /// for both sides, or any byte appears twice across the table.
    pub fn from_pairs(pairs: &[(u8, u8)]) -> TableResult<Self> {
        if pairs.is_empty() {
            return Err(TableError::Empty);
        }

        let mut classes = [BracketClass::Ignored; 256];
        for &(opener, closer) in pairs {
            if opener == closer {
                return Err(TableError::SameCharacter(opener as char));
            }
            for byte in [opener, closer] {
                if classes[byte as usize] != BracketClass::Ignored {
                    return Err(TableError::Duplicate(byte as char));
                }
            }
            classes[opener as usize] = BracketClass::Opening { closer };
            classes[closer as usize] = BracketClass::Closing { opener };
        }

        Ok(Self {
            classes,
            pairs: pairs.to_vec(),
        })
    }

    /// Parses textual pairs such as `"{}"` or `"<>"`.
    pub fn parse<S: AsRef<str>>(pairs: &[S]) -> TableResult<Self> {
        let parsed = pairs
            .iter()
            .map(|pair| {
                let pair = pair.as_ref();
                match pair.as_bytes() {
                    [opener, closer] if opener.is_ascii() && closer.is_ascii() => {
                        Ok((*opener, *closer))
                    }
                    _ => Err(TableError::InvalidPair(pair.to_string())),
                }
            })
            .collect::<TableResult<Vec<_>>>()?;

        Self::from_pairs(&parsed)
    }

    /// Classifies one byte.
    #[inline]
    pub fn classify(&self, byte: u8) -> BracketClass {
        self.classes[byte as usize]
    }

    /// Returns the closer matching `opener`, if it is an opener.
    pub fn closer_for(&self, opener: u8) -> Option<u8> {
        match self.classify(opener) {
            BracketClass::Opening { closer } => Some(closer),
            _ => None,
        }
    }

    /// Returns the configured pairs in declaration order.
    pub fn pairs(&self) -> &[(u8, u8)] {
        &self.pairs
    }
}

impl Default for BracketTable {
    fn default() -> Self {
        let mut classes = [BracketClass::Ignored; 256];
        for (opener, closer) in DEFAULT_PAIRS {
            classes[opener as usize] = BracketClass::Opening { closer };
            classes[closer as usize] = BracketClass::Closing { opener };
        }
        Self {
            classes,
            pairs: DEFAULT_PAIRS.to_vec(),
        }
    }
}

impl fmt::Debug for BracketTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .pairs
            .iter()
            .map(|&(o, c)| format!("{}{}", o as char, c as char))
            .collect();
        f.debug_struct("BracketTable").field("pairs", &pairs).finish()
    }
}
