//! CLI command implementations
//!
//! Every command loads the config, opens the dataset store on its data
//! directory and writes exactly one JSON response to stdout.

use std::io;
use std::path::Path;

use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::dataset::{Dataset, DatasetStore, Record};
use crate::executor::QueryEngine;
use crate::schema::SchemaKind;

use super::args::{Cli, Command, DatasetAction};
use super::config::Config;
use super::errors::CliResult;
use super::io::{read_json_file, read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments, loads config, installs logging and dispatches.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = Config::load(cli.command.config_path())?;
    init_logging(&config.log_level);
    run_command(cli.command, &config)
}

/// Logs go to stderr; RUST_LOG overrides the configured level
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, config: &Config) -> CliResult<()> {
    let result = match cmd {
        Command::Query { file, .. } => query(config, file.as_deref()),
        Command::Datasets { action } => match action {
            DatasetAction::List { .. } => list_datasets(config),
            DatasetAction::Add { id, kind, file, .. } => add_dataset(config, &id, kind, &file),
            DatasetAction::Remove { id, .. } => remove_dataset(config, &id),
        },
    };
    respond(result)
}

/// Query and store failures become error responses; the rest abort.
fn respond(result: CliResult<Value>) -> CliResult<()> {
    match result {
        Ok(data) => write_response(data),
        Err(e) if e.is_response() => write_error(e.code_str(), e.message()),
        Err(e) => Err(e),
    }
}

/// Execute a single query read from `file` or stdin
pub fn query(config: &Config, file: Option<&Path>) -> CliResult<Value> {
    let request = match file {
        Some(path) => read_json_file(path)?,
        None => read_request()?,
    };
    execute_query(config, &request)
}

/// Execute a parsed query document against the configured data directory
pub fn execute_query(config: &Config, request: &Value) -> CliResult<Value> {
    let store = DatasetStore::open(config.data_path())?;
    let engine = QueryEngine::new(&store, config.executor_config());
    let rows = engine.perform_query(request)?;
    Ok(serde_json::to_value(rows)?)
}

/// List every stored dataset
pub fn list_datasets(config: &Config) -> CliResult<Value> {
    let store = DatasetStore::open(config.data_path())?;
    Ok(serde_json::to_value(store.list())?)
}

/// Add a dataset from a JSON array of records; returns all dataset ids
pub fn add_dataset(config: &Config, id: &str, kind: SchemaKind, file: &Path) -> CliResult<Value> {
    let records: Vec<Record> = read_json_file(file)?;
    let dataset = Dataset::new(id, kind, records)?;

    let mut store = DatasetStore::open(config.data_path())?;
    let ids = store.add(dataset)?;
    info!(id = %id, total = ids.len(), "dataset stored");
    Ok(json!(ids))
}

/// Remove a dataset; returns its id
pub fn remove_dataset(config: &Config, id: &str) -> CliResult<Value> {
    let mut store = DatasetStore::open(config.data_path())?;
    let removed = store.remove(id)?;
    Ok(json!(removed))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().join("data").to_string_lossy().into_owned(),
            max_results: 5000,
            log_level: "warn".to_string(),
        }
    }

    fn write_records(temp_dir: &TempDir, records: Value) -> std::path::PathBuf {
        let path = temp_dir.path().join("records.json");
        fs::write(&path, records.to_string()).unwrap();
        path
    }

    fn room(shortname: &str, seats: u32) -> Value {
        json!({
            "fullname": "Hugh Dempster Pavilion", "shortname": shortname, "number": "110",
            "name": format!("{}_110", shortname), "address": "6245 Agronomy Road",
            "lat": 49.26125, "lon": -123.24807, "seats": seats, "type": "Tiered Large Group",
            "furniture": "Classroom-Fixed Tablets", "href": "http://example.com/DMP-110"
        })
    }

    #[test]
    fn test_add_list_remove() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);
        let file = write_records(&temp_dir, json!([room("DMP", 120), room("ANGU", 80)]));

        let ids = add_dataset(&config, "rooms", SchemaKind::Rooms, &file).unwrap();
        assert_eq!(ids, json!(["rooms"]));

        let listed = list_datasets(&config).unwrap();
        assert_eq!(listed, json!([{ "id": "rooms", "kind": "rooms", "num_rows": 2 }]));

        assert_eq!(remove_dataset(&config, "rooms").unwrap(), json!("rooms"));
        assert_eq!(list_datasets(&config).unwrap(), json!([]));
    }

    #[test]
    fn test_query_after_add() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);
        let file = write_records(&temp_dir, json!([room("DMP", 120), room("ANGU", 80)]));
        add_dataset(&config, "rooms", SchemaKind::Rooms, &file).unwrap();

        let data = execute_query(
            &config,
            &json!({
                "FILTER": { "GREATER_THAN": { "rooms_seats": 100 } },
                "OPTIONS": { "COLUMNS": ["rooms_shortname", "rooms_seats"] }
            }),
        )
        .unwrap();
        assert_eq!(data, json!([{ "rooms_shortname": "DMP", "rooms_seats": 120 }]));
    }

    #[test]
    fn test_malformed_records_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);
        let file = write_records(&temp_dir, json!([{ "shortname": "DMP" }]));

        let err = add_dataset(&config, "rooms", SchemaKind::Rooms, &file).unwrap_err();
        assert_eq!(err.code_str(), "INSIGHT_INVALID_INPUT");
        assert!(err.is_response());
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);

        let err = remove_dataset(&config, "rooms").unwrap_err();
        assert_eq!(err.code_str(), "INSIGHT_NOT_FOUND");
    }

    #[test]
    fn test_bad_query_is_invalid_input() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);

        let err = execute_query(&config, &json!({ "FILTER": {} })).unwrap_err();
        assert_eq!(
            err.code(),
            &CliErrorCode::Query(crate::planner::QueryErrorCode::InvalidInput)
        );
    }
}
