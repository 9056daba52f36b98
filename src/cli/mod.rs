//! CLI module for insightdb
//!
//! Provides command-line interface for:
//! - query: One-shot query execution
//! - datasets list/add/remove: Dataset store management

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, DatasetAction};
pub use commands::{
    add_dataset, execute_query, list_datasets, query, remove_dataset, run, run_command,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_json_file, read_request, write_error, write_response};
