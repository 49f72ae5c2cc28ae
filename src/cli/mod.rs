//! CLI module for bracketstack
//!
//! Provides command-line interface for:
//! - init: Write a default configuration file
//! - suite: Run the generated stream suite
//! - check: Validate a file or stdin

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, check_report, init, run, run_command, suite, suite_report};
pub use config::{Config, StoreConfig, StoreKind};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
