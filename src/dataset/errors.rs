//! # Dataset Store Errors

use thiserror::Error;

use crate::planner::QueryError;

/// Result type for dataset store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Dataset store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid dataset id: '{0}'")]
    InvalidId(String),

    #[error("Dataset already exists: {0}")]
    AlreadyExists(String),

    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Malformed record {index} in dataset '{dataset}': {reason}")]
    MalformedRecord {
        dataset: String,
        index: usize,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Stable error code for transport layers
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidId(_) => "INSIGHT_INVALID_INPUT",
            StoreError::AlreadyExists(_) => "INSIGHT_INVALID_INPUT",
            StoreError::NotFound(_) => "INSIGHT_NOT_FOUND",
            StoreError::MalformedRecord { .. } => "INSIGHT_INVALID_INPUT",
            StoreError::Io(_) => "INSIGHT_IO_ERROR",
            StoreError::Serialization(_) => "INSIGHT_IO_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<StoreError> for QueryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => QueryError::not_found(id),
            other => QueryError::invalid_input(other.to_string()),
        }
    }
}
