//! Matter CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, prints errors to
//! stderr and exits non-zero on failure. Nothing else happens here.

use matter_core::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}: {}", e.code_str(), e);
        std::process::exit(e.exit_code());
    }
}
