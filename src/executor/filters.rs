//! Filter evaluation for query execution
//!
//! Evaluates a filter tree against one record at a time. Negation is
//! applied after a node's own logic, so nested NEGATEs compose.

use crate::dataset::{FieldValue, Record};
use crate::planner::{
    Comparison, ComparisonOp, Composite, FilterNode, LogicalOp, Operand, QueryError, QueryResult,
};
use crate::schema::FieldRef;

/// Fetches a record's value for a resolved field, checking its type.
pub(crate) fn record_value<'r>(record: &'r Record, field: &FieldRef) -> QueryResult<&'r FieldValue> {
    let value = record.get(field.field.name()).ok_or_else(|| {
        QueryError::invalid_field(field.key(), format!("Record has no field '{}'", field.field))
    })?;

    if !field.field_type().matches(value) {
        return Err(QueryError::invalid_field(
            field.key(),
            format!(
                "Record value {} for '{}' is not a {}",
                value,
                field.field,
                field.field_type().type_name()
            ),
        ));
    }
    Ok(value)
}

/// Evaluates filter trees against records
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Returns true if `record` satisfies `node`
    pub fn evaluate(node: &FilterNode, record: &Record) -> QueryResult<bool> {
        match node {
            FilterNode::Comparison(c) => Self::evaluate_comparison(c, record),
            FilterNode::Composite(c) => Self::evaluate_composite(c, record),
        }
    }

    fn evaluate_comparison(comparison: &Comparison, record: &Record) -> QueryResult<bool> {
        let value = record_value(record, &comparison.field)?;

        let result = match (comparison.op, &comparison.operand, value) {
            (ComparisonOp::LessThan, Operand::Number(bound), FieldValue::Number(n)) => n < bound,
            (ComparisonOp::GreaterThan, Operand::Number(bound), FieldValue::Number(n)) => n > bound,
            (ComparisonOp::Equals, Operand::Number(expected), FieldValue::Number(n)) => n == expected,
            (ComparisonOp::Equals, Operand::Text(expected), FieldValue::Text(s)) => s == expected,
            (ComparisonOp::Matches, Operand::Pattern(pattern), FieldValue::Text(s)) => {
                pattern.is_match(s)
            }
            _ => {
                return Err(QueryError::invalid_field(
                    comparison.field.key(),
                    format!(
                        "{} can not compare {} against {:?}",
                        comparison.op.as_str(),
                        value,
                        comparison.operand
                    ),
                ));
            }
        };

        Ok(result != comparison.negated)
    }

    /// ALL_OF stops at the first false child, ANY_OF at the first true one.
    fn evaluate_composite(composite: &Composite, record: &Record) -> QueryResult<bool> {
        let short_circuit_on = match composite.op {
            LogicalOp::AllOf => false,
            LogicalOp::AnyOf => true,
        };

        let children = composite
            .comparisons
            .iter()
            .map(|c| Self::evaluate_comparison(c, record))
            .chain(
                composite
                    .composites
                    .iter()
                    .map(|c| Self::evaluate_composite(c, record)),
            );

        let mut result = !short_circuit_on;
        for child in children {
            if child? == short_circuit_on {
                result = short_circuit_on;
                break;
            }
        }

        Ok(result != composite.negated)
    }
}
