//! Query executor for insightdb
//!
//! Executes query plans against a dataset snapshot.
//!
//! Execution flow (strict order):
//! 1. Look up the plan's dataset
//! 2. Scan every record, keeping those the filter accepts
//! 3. Group, aggregate, cap, sort and project (see `formatter`)
//! 4. Return ordered rows
//!
//! The dataset is only read. Concurrent queries over the same lookup need
//! no synchronization as long as nothing mutates it meanwhile.

use serde_json::Value;
use tracing::{debug, info};

use crate::dataset::{DatasetLookup, Record, ResultRow};
use crate::planner::{QueryError, QueryParser, QueryPlan, QueryResult};

use super::filters::FilterEvaluator;
use super::formatter::ResultFormatter;
use super::result::ExecutionResult;

/// Largest result set a query may produce
pub const DEFAULT_MAX_RESULTS: usize = 5000;

/// Executor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Queries producing more rows than this fail with ResultTooLarge
    pub max_results: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Query executor that processes plans against datasets
pub struct QueryExecutor<'a, L: DatasetLookup> {
    lookup: &'a L,
    config: ExecutorConfig,
}

impl<'a, L: DatasetLookup> QueryExecutor<'a, L> {
    /// Creates a new executor
    pub fn new(lookup: &'a L, config: ExecutorConfig) -> Self {
        Self { lookup, config }
    }

    /// Executes a query plan and returns results.
    ///
    /// Deterministic: same plan + same data = same rows, in the same order.
    pub fn execute(&self, plan: &QueryPlan) -> QueryResult<ExecutionResult> {
        let dataset = self
            .lookup
            .dataset(&plan.dataset_id)
            .ok_or_else(|| QueryError::not_found(&plan.dataset_id))?;

        let mut matched: Vec<&Record> = Vec::new();
        for record in dataset.records() {
            let keep = match &plan.filter {
                Some(filter) => FilterEvaluator::evaluate(filter, record)?,
                None => true,
            };
            if keep {
                matched.push(record);
            }
        }

        debug!(
            dataset = %plan.dataset_id,
            scanned = dataset.len(),
            matched = matched.len(),
            "filter scan complete"
        );

        let rows = ResultFormatter::new(plan, self.config.max_results).format(&matched)?;

        Ok(ExecutionResult {
            rows,
            scanned_count: dataset.len(),
            matched_count: matched.len(),
        })
    }
}

/// Parses and executes raw queries against a dataset lookup
pub struct QueryEngine<'a, L: DatasetLookup> {
    lookup: &'a L,
    config: ExecutorConfig,
}

impl<'a, L: DatasetLookup> QueryEngine<'a, L> {
    pub fn new(lookup: &'a L, config: ExecutorConfig) -> Self {
        Self { lookup, config }
    }

    /// Runs one query document end to end.
    pub fn perform_query(&self, query: &Value) -> QueryResult<Vec<ResultRow>> {
        match self.run(query) {
            Ok(result) => {
                info!(
                    scanned = result.scanned_count,
                    matched = result.matched_count,
                    returned = result.len(),
                    "query complete"
                );
                Ok(result.into_rows())
            }
            Err(e) => {
                info!(code = e.code().code(), error = %e, "query rejected");
                Err(e)
            }
        }
    }

    fn run(&self, query: &Value) -> QueryResult<ExecutionResult> {
        let plan = QueryParser::new(self.lookup).parse(query)?;
        QueryExecutor::new(self.lookup, self.config).execute(&plan)
    }
}
