//! insightdb - structured filter and aggregate queries over course and
//! room datasets
//!
//! A query document is parsed into a typed plan (`planner`), run as a
//! single scan over one dataset (`executor`) and returned as ordered,
//! projected rows.

pub mod cli;
pub mod dataset;
pub mod executor;
pub mod planner;
pub mod schema;

pub use dataset::{Dataset, DatasetLookup, DatasetStore, FieldValue, Record, ResultRow};
pub use executor::{ExecutorConfig, QueryEngine};
pub use planner::{QueryError, QueryErrorCode, QueryResult};
pub use schema::SchemaKind;
