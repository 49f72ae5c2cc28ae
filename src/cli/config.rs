//! Configuration file
//!
//! ```json
//! {
//!   "store": { "kind": "file", "path": "./buffer.txt", "sync_writes": false },
//!   "channel_capacity": 65536,
//!   "brackets": ["{}", "[]", "()"],
//!   "suite": [{ "kind": "valid", "name": "small-valid", "count": 1 }]
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults above and
//! the suite defaults to the five reference streams.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::brackets::BracketTable;
use crate::feed::DEFAULT_CAPACITY;
use crate::generators::{default_suite, StreamCase};
use crate::stack::{AddressableStore, FileStore, MemoryStore, StackError};

/// Which backing store to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    File,
    Memory,
}

/// Backing store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store kind (default "file")
    #[serde(default = "default_store_kind")]
    pub kind: StoreKind,

    /// File path, used by the file store only (default "./buffer.txt")
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Flush every write to disk (default false)
    #[serde(default)]
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: default_store_kind(),
            path: default_store_path(),
            sync_writes: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    /// Feed queue capacity in bytes (default 65536)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Bracket pairs, each a two-character string "open close"
    #[serde(default = "default_brackets")]
    pub brackets: Vec<String>,

    /// Streams run by the `suite` command
    #[serde(default = "default_suite")]
    pub suite: Vec<StreamCase>,
}

fn default_store_kind() -> StoreKind {
    StoreKind::File
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./buffer.txt")
}
fn default_channel_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_brackets() -> Vec<String> {
    vec!["{}".to_string(), "[]".to_string(), "()".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            channel_capacity: default_channel_capacity(),
            brackets: default_brackets(),
            suite: default_suite(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.channel_capacity == 0 {
            return Err(CliError::config_error("channel_capacity must be > 0"));
        }

        if self.store.kind == StoreKind::File && self.store.path.as_os_str().is_empty() {
            return Err(CliError::config_error("store.path must not be empty"));
        }

        self.bracket_table()?;

        for case in &self.suite {
            case.validate().map_err(CliError::config_error)?;
        }

        Ok(())
    }

    /// Builds the bracket table from `brackets`.
    pub fn bracket_table(&self) -> CliResult<BracketTable> {
        Ok(BracketTable::parse(self.brackets.as_slice())?)
    }

    /// Opens a fresh backing store.
    ///
    /// The file store is truncated on open. Failing to open it is a
    /// storage failure, reported with `BRACE_STORAGE_IO_ERROR`.
    pub fn open_store(&self) -> CliResult<Box<dyn AddressableStore>> {
        match self.store.kind {
            StoreKind::Memory => Ok(Box::new(MemoryStore::new())),
            StoreKind::File => {
                let store = FileStore::create(&self.store.path, self.store.sync_writes).map_err(|e| {
                    StackError::io_error(
                        format!("Failed to open store {}", self.store.path.display()),
                        e,
                    )
                })?;
                Ok(Box::new(store))
            }
        }
    }
}
