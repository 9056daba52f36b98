//! Query Planner subsystem for insightdb
//!
//! Turns an untyped JSON query document into a validated [`QueryPlan`].
//!
//! # Design Principles
//!
//! - Fail fast: the first violation aborts parsing
//! - Single dataset: every field reference shares one dataset id
//! - Typed: operands are checked against declared field types
//! - Immutable: a plan is built once and only read afterwards

mod ast;
mod errors;
mod parser;

pub use ast::{
    AggregateOp, AggregateSpec, Comparison, ComparisonOp, Composite, FilterNode, LogicalOp,
    Operand, QueryPlan, SortDirection, SortSpec, WildcardPattern,
};
pub use errors::{QueryError, QueryErrorCode, QueryResult};
pub use parser::QueryParser;
