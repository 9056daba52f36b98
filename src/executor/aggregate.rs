//! Grouping and aggregation
//!
//! Records are bucketed by the canonical encoding of their group-field
//! values. Buckets keep first-seen order. The result cap is enforced while
//! buckets accumulate, so an oversized grouping fails before any
//! aggregate is computed.

use std::collections::{HashMap, HashSet};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::dataset::{FieldValue, Record, ResultRow};
use crate::planner::{AggregateOp, AggregateSpec, QueryError, QueryPlan, QueryResult};

use super::filters::record_value;

struct Bucket<'r> {
    key: Vec<&'r FieldValue>,
    members: Vec<&'r Record>,
}

/// Groups filtered records and computes APPLY columns
pub struct GroupAggregator<'p> {
    plan: &'p QueryPlan,
    max_results: usize,
}

impl<'p> GroupAggregator<'p> {
    pub fn new(plan: &'p QueryPlan, max_results: usize) -> Self {
        Self { plan, max_results }
    }

    /// One row per bucket: qualified group fields, then APPLY names.
    pub fn aggregate(&self, records: &[&Record]) -> QueryResult<Vec<ResultRow>> {
        let buckets = self.group(records)?;
        buckets.iter().map(|bucket| self.bucket_row(bucket)).collect()
    }

    fn group<'r>(&self, records: &[&'r Record]) -> QueryResult<Vec<Bucket<'r>>> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut buckets: Vec<Bucket<'r>> = Vec::new();
        let mut canonical = String::new();

        for &record in records {
            canonical.clear();
            let mut key = Vec::with_capacity(self.plan.group.len());
            for field in &self.plan.group {
                let value = record_value(record, field)?;
                value.write_canonical(&mut canonical);
                key.push(value);
            }

            if let Some(&slot) = index.get(&canonical) {
                buckets[slot].members.push(record);
                continue;
            }

            if buckets.len() >= self.max_results {
                return Err(QueryError::result_too_large(self.max_results));
            }
            index.insert(canonical.clone(), buckets.len());
            buckets.push(Bucket {
                key,
                members: vec![record],
            });
        }

        Ok(buckets)
    }

    fn bucket_row(&self, bucket: &Bucket<'_>) -> QueryResult<ResultRow> {
        let mut row = ResultRow::with_capacity(bucket.key.len() + self.plan.aggregates.len());
        for (field, value) in self.plan.group.iter().zip(&bucket.key) {
            row.push(field.key(), (*value).clone());
        }
        for spec in &self.plan.aggregates {
            row.push(spec.name.clone(), Self::compute(spec, &bucket.members)?);
        }
        Ok(row)
    }

    fn compute(spec: &AggregateSpec, members: &[&Record]) -> QueryResult<FieldValue> {
        let result = match spec.op {
            AggregateOp::Count => return Self::count_distinct(spec, members),
            AggregateOp::Max => Self::numbers(spec, members)?
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max),
            AggregateOp::Min => Self::numbers(spec, members)?
                .into_iter()
                .fold(f64::INFINITY, f64::min),
            AggregateOp::Sum => Self::numbers(spec, members)?.into_iter().sum(),
            AggregateOp::Avg => average(&Self::numbers(spec, members)?).ok_or_else(|| {
                QueryError::invalid_field(
                    &spec.name,
                    format!("AVG of '{}' is not representable", spec.target.key()),
                )
            })?,
        };

        Ok(FieldValue::Number(result))
    }

    /// COUNT is the number of distinct values, not rows
    fn count_distinct(spec: &AggregateSpec, members: &[&Record]) -> QueryResult<FieldValue> {
        let mut seen = HashSet::new();
        let mut canonical = String::new();
        for record in members {
            canonical.clear();
            record_value(record, &spec.target)?.write_canonical(&mut canonical);
            if !seen.contains(&canonical) {
                seen.insert(canonical.clone());
            }
        }
        Ok(FieldValue::Number(seen.len() as f64))
    }

    fn numbers(spec: &AggregateSpec, members: &[&Record]) -> QueryResult<Vec<f64>> {
        members
            .iter()
            .map(|record| {
                record_value(record, &spec.target)?
                    .as_number()
                    .ok_or_else(|| {
                        QueryError::invalid_field(
                            &spec.name,
                            format!("Can not perform {} on '{}'", spec.op, spec.target.key()),
                        )
                    })
            })
            .collect()
    }
}

/// Decimal mean rounded half away from zero to 2 places.
fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sum = Decimal::ZERO;
    for value in values {
        sum = sum.checked_add(Decimal::from_f64(*value)?)?;
    }

    let mean = sum.checked_div(Decimal::from(values.len()))?;
    mean.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}
