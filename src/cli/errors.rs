//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::brackets::TableError;
use crate::feed::FeedError;
use crate::generators::SourceError;
use crate::stack::StackError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout, input file)
    IoError,
    /// Config file already exists
    AlreadyInitialized,
    /// Runtime or store could not be brought up
    BootFailed,
    /// Backing store failed mid-run
    StorageFailed,
    /// Producer lost the feed for a reason other than shutdown
    FeedFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "BRACE_CLI_CONFIG_ERROR",
            Self::IoError => "BRACE_CLI_IO_ERROR",
            Self::AlreadyInitialized => "BRACE_CLI_ALREADY_INITIALIZED",
            Self::BootFailed => "BRACE_CLI_BOOT_FAILED",
            Self::StorageFailed => "BRACE_CLI_STORAGE_FAILED",
            Self::FeedFailed => "BRACE_CLI_FEED_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Config file already present
    pub fn already_initialized(path: &std::path::Path) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("Config file already exists: {}", path.display()),
        )
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Storage failed
    pub fn storage_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::StorageFailed, msg)
    }

    /// Feed failed
    pub fn feed_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::FeedFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<TableError> for CliError {
    fn from(e: TableError) -> Self {
        Self::config_error(format!("Invalid brackets: {}", e))
    }
}

impl From<StackError> for CliError {
    fn from(e: StackError) -> Self {
        Self::storage_failed(e.to_string())
    }
}

impl From<FeedError> for CliError {
    fn from(e: FeedError) -> Self {
        Self::feed_failed(e.to_string())
    }
}

impl From<SourceError> for CliError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Feed(feed) => feed.into(),
            SourceError::Io(io) => io.into(),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
