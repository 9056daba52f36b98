//! Configuration file handling
//!
//! ```json
//! { "data_dir": "./data", "max_results": 5000, "log_level": "warn" }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::executor::{ExecutorConfig, DEFAULT_MAX_RESULTS};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory holding one `<id>.json` per dataset (required)
    pub data_dir: String,

    /// Result cap (optional, default 5000)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Log filter when RUST_LOG is unset (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.max_results == 0 {
            return Err(CliError::config_error("max_results must be > 0"));
        }

        if self.log_level.trim().is_empty() {
            return Err(CliError::config_error("log_level must not be empty"));
        }

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Executor settings derived from this config
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_results: self.max_results,
        }
    }
}
