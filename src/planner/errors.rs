//! Query error types
//!
//! Error codes:
//! - INSIGHT_INVALID_INPUT (REJECT)
//! - INSIGHT_RESULT_TOO_LARGE (REJECT)
//! - INSIGHT_NOT_FOUND (REJECT)

use std::fmt;

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed query, bad field reference, or type mismatch
    InvalidInput,
    /// Result set exceeds the configured cap
    ResultTooLarge,
    /// Dataset does not exist
    NotFound,
}

impl QueryErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::InvalidInput => "INSIGHT_INVALID_INPUT",
            QueryErrorCode::ResultTooLarge => "INSIGHT_RESULT_TOO_LARGE",
            QueryErrorCode::NotFound => "INSIGHT_NOT_FOUND",
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with context
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    field: Option<String>,
}

impl QueryError {
    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::InvalidInput,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an invalid input error attributed to a query key
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::InvalidInput,
            message: reason.into(),
            field: Some(field.into()),
        }
    }

    /// Create a result too large error
    pub fn result_too_large(limit: usize) -> Self {
        Self {
            code: QueryErrorCode::ResultTooLarge,
            message: format!("Query would return more than {} results", limit),
            field: None,
        }
    }

    /// Create a dataset not found error
    pub fn not_found(dataset_id: impl Into<String>) -> Self {
        let id = dataset_id.into();
        Self {
            code: QueryErrorCode::NotFound,
            message: format!("Dataset '{}' not found", id),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending query key if known
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn is_invalid_input(&self) -> bool {
        self.code == QueryErrorCode::InvalidInput
    }

    pub fn is_result_too_large(&self) -> bool {
        self.code == QueryErrorCode::ResultTooLarge
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref field) = self.field {
            write!(f, " (at '{}')", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
