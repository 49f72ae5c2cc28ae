//! Stack error types
//!
//! Error codes:
//! - BRACE_STACK_EMPTY (ERROR severity) - pop on an empty stack, recovered by the validator
//! - BRACE_STORAGE_IO_ERROR (FATAL severity) - backing store read/write failed
//! - BRACE_VALIDATOR_HALTED (FATAL severity) - input offered after a storage failure

use std::fmt;
use std::io;

/// Severity levels for stack errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, engine continues
    Error,
    /// Engine must stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Stack-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackErrorCode {
    /// Nothing to pop
    BraceStackEmpty,
    /// Backing store I/O failure
    BraceStorageIoError,
    /// Validator refused input after a fatal error
    BraceValidatorHalted,
}

impl StackErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StackErrorCode::BraceStackEmpty => "BRACE_STACK_EMPTY",
            StackErrorCode::BraceStorageIoError => "BRACE_STORAGE_IO_ERROR",
            StackErrorCode::BraceValidatorHalted => "BRACE_VALIDATOR_HALTED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StackErrorCode::BraceStackEmpty => Severity::Error,
            StackErrorCode::BraceStorageIoError => Severity::Fatal,
            StackErrorCode::BraceValidatorHalted => Severity::Fatal,
        }
    }
}

impl fmt::Display for StackErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Stack error with code, message and optional I/O source
#[derive(Debug)]
pub struct StackError {
    code: StackErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StackError {
    /// Pop was called with offset 0
    pub fn empty() -> Self {
        Self {
            code: StackErrorCode::BraceStackEmpty,
            message: "Stack is empty".to_string(),
            details: None,
            source: None,
        }
    }

    /// Backing store write failed at `offset`
    pub fn write_failed(offset: u64, source: io::Error) -> Self {
        Self {
            code: StackErrorCode::BraceStorageIoError,
            message: "Failed to write stack cell".to_string(),
            details: Some(format!("byte_offset: {}", offset)),
            source: Some(source),
        }
    }

    /// Backing store read failed at `offset`
    pub fn read_failed(offset: u64, source: io::Error) -> Self {
        Self {
            code: StackErrorCode::BraceStorageIoError,
            message: "Failed to read stack cell".to_string(),
            details: Some(format!("byte_offset: {}", offset)),
            source: Some(source),
        }
    }

    /// Backing store could not be opened or prepared
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StackErrorCode::BraceStorageIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Validator was poisoned by an earlier fatal error
    pub fn halted() -> Self {
        Self {
            code: StackErrorCode::BraceValidatorHalted,
            message: "Validator halted after a storage failure".to_string(),
            details: None,
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StackErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns true for an empty-stack pop
    pub fn is_empty_stack(&self) -> bool {
        self.code == StackErrorCode::BraceStackEmpty
    }

    /// Returns whether this error is fatal (engine must stop)
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for stack operations
pub type StackResult<T> = Result<T, StackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StackErrorCode::BraceStackEmpty.code(), "BRACE_STACK_EMPTY");
        assert_eq!(
            StackErrorCode::BraceStorageIoError.code(),
            "BRACE_STORAGE_IO_ERROR"
        );
        assert_eq!(
            StackErrorCode::BraceValidatorHalted.code(),
            "BRACE_VALIDATOR_HALTED"
        );
    }

    #[test]
    fn test_empty_stack_is_recoverable() {
        let err = StackError::empty();
        assert!(err.is_empty_stack());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_storage_failure_is_fatal() {
        let err = StackError::write_failed(7, io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(err.is_fatal());
        assert!(!err.is_empty_stack());
        assert_eq!(err.details(), Some("byte_offset: 7"));
    }

    #[test]
    fn test_display_contains_required_fields() {
        let err = StackError::read_failed(42, io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        let display = format!("{}", err);
        assert!(display.contains("FATAL"));
        assert!(display.contains("BRACE_STORAGE_IO_ERROR"));
        assert!(display.contains("byte_offset: 42"));
        assert!(display.contains("eof"));
    }
}
