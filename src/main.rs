//! insightdb CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Delegates parsing and dispatch to cli::run
//! 2. Prints fatal errors to stderr
//! 3. Exits with non-zero on failure

use insightdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
