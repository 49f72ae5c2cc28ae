//! CLI argument definitions using clap
//!
//! Commands:
//! - bracketstack init [--config <path>]
//! - bracketstack suite [--config <path>] [--wait]
//! - bracketstack check [--config <path>] [--input <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bracketstack - streaming bracket validation over a storage-backed stack
#[derive(Parser, Debug)]
#[command(name = "bracketstack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path of the configuration file to create
        #[arg(long, default_value = "./bracketstack.json")]
        config: PathBuf,
    },

    /// Feed the generated stream suite through the validator
    Suite {
        /// Path to configuration file (defaults apply if omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keep running after the suite until Ctrl-C
        #[arg(long)]
        wait: bool,
    },

    /// Validate a file or stdin and print the verdicts
    Check {
        /// Path to configuration file (defaults apply if omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suite_with_wait() {
        let cli = Cli::try_parse_from(["bracketstack", "suite", "--wait"]).unwrap();
        match cli.command {
            Command::Suite { config, wait } => {
                assert!(config.is_none());
                assert!(wait);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_default_path() {
        let cli = Cli::try_parse_from(["bracketstack", "init"]).unwrap();
        match cli.command {
            Command::Init { config } => assert_eq!(config, PathBuf::from("./bracketstack.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_input() {
        let cli = Cli::try_parse_from(["bracketstack", "check", "--input", "in.txt"]).unwrap();
        match cli.command {
            Command::Check { input, .. } => assert_eq!(input, Some(PathBuf::from("in.txt"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
