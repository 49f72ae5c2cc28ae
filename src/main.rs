//! bracketstack CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero on
//! failure. Nothing else happens here.

use bracketstack::cli;

fn main() {
    if let Err(e) = cli::run() {
        let _ = cli::write_error(e.code_str(), e.message());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
