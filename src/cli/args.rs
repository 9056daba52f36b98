//! CLI argument definitions using clap
//!
//! Commands:
//! - insightdb query --config <path> [--file <query.json>]
//! - insightdb datasets list --config <path>
//! - insightdb datasets add --config <path> --id <id> --kind <kind> --file <records.json>
//! - insightdb datasets remove --config <path> --id <id>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::schema::SchemaKind;

/// insightdb - structured queries over course and room datasets
#[derive(Parser, Debug)]
#[command(name = "insightdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single query and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,

        /// Read the query from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Manage stored datasets
    Datasets {
        #[command(subcommand)]
        action: DatasetAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum DatasetAction {
    /// List all datasets
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,
    },

    /// Add a dataset from a JSON array of records
    Add {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,

        /// Dataset id (non-blank, no '_')
        #[arg(long)]
        id: String,

        /// Record kind: courses or rooms
        #[arg(long, value_parser = parse_kind)]
        kind: SchemaKind,

        /// Records file
        #[arg(long)]
        file: PathBuf,
    },

    /// Remove a dataset
    Remove {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,

        /// Dataset id
        #[arg(long)]
        id: String,
    },
}

fn parse_kind(s: &str) -> Result<SchemaKind, String> {
    SchemaKind::from_name(s).ok_or_else(|| format!("unknown kind '{}', expected courses or rooms", s))
}

impl Command {
    /// Configuration file named by the command
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Query { config, .. } => config,
            Command::Datasets { action } => match action {
                DatasetAction::List { config }
                | DatasetAction::Add { config, .. }
                | DatasetAction::Remove { config, .. } => config,
            },
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
