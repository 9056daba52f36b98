//! Query Executor subsystem for insightdb
//!
//! Consumes validated plans and produces deterministic, ordered rows.
//!
//! # Execution Flow (strict order)
//!
//! 1. Scan the target dataset once
//! 2. Keep records accepted by the filter tree
//! 3. Group and aggregate (if TRANSFORM is present)
//! 4. Enforce the result cap
//! 5. Sort by ORDER keys
//! 6. Project to COLUMNS

mod aggregate;
mod executor;
mod filters;
mod formatter;
mod result;
mod sorter;

pub use aggregate::GroupAggregator;
pub use executor::{ExecutorConfig, QueryEngine, QueryExecutor, DEFAULT_MAX_RESULTS};
pub use filters::FilterEvaluator;
pub use formatter::ResultFormatter;
pub use result::ExecutionResult;
pub use sorter::ResultSorter;
