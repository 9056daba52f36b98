//! Query parser
//!
//! Converts an untyped JSON query document into a [`QueryPlan`].
//!
//! Parsing order:
//! 1. Top-level and OPTIONS key sets
//! 2. COLUMNS, whose first entry fixes the target dataset
//! 3. FILTER tree
//! 4. ORDER
//! 5. TRANSFORM (GROUP and APPLY)
//!
//! The first violation aborts parsing. No partial plan is returned.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::dataset::DatasetLookup;
use crate::schema::{split_key, FieldRef, FieldResolver, FieldType};

use super::ast::{
    AggregateOp, AggregateSpec, Comparison, ComparisonOp, Composite, FilterNode, LogicalOp,
    Operand, QueryPlan, SortDirection, SortSpec, WildcardPattern,
};
use super::errors::{QueryError, QueryResult};

const FILTER: &str = "FILTER";
const OPTIONS: &str = "OPTIONS";
const TRANSFORM: &str = "TRANSFORM";
const COLUMNS: &str = "COLUMNS";
const ORDER: &str = "ORDER";
const GROUP: &str = "GROUP";
const APPLY: &str = "APPLY";
const NEGATE: &str = "NEGATE";

/// Returns true if `object` has exactly `expected` as keys, none null
fn has_exact_keys(object: &Map<String, Value>, expected: &[&str]) -> bool {
    object.len() == expected.len()
        && expected
            .iter()
            .all(|k| object.get(*k).is_some_and(|v| !v.is_null()))
}

fn as_object<'v>(value: &'v Value, what: &str) -> QueryResult<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| QueryError::invalid_input(format!("{} must be an object", what)))
}

/// Reads a non-empty array of strings
fn string_array<'v>(value: &'v Value, what: &str) -> QueryResult<Vec<&'v str>> {
    let items = value
        .as_array()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| QueryError::invalid_input(format!("{} must be a non-empty array", what)))?;

    items
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                QueryError::invalid_input(format!("{} must only contain strings, got {}", what, item))
            })
        })
        .collect()
}

/// Returns the single `(key, value)` entry of an object
fn single_entry<'v>(object: &'v Map<String, Value>, what: &str) -> QueryResult<(&'v str, &'v Value)> {
    let mut iter = object.iter();
    match (iter.next(), iter.next()) {
        (Some((k, v)), None) => Ok((k.as_str(), v)),
        _ => Err(QueryError::invalid_input(format!(
            "Expected exactly one key in {}, got {}",
            what,
            object.len()
        ))),
    }
}

/// Parses queries against the datasets visible through a lookup
pub struct QueryParser<'a, L: DatasetLookup> {
    lookup: &'a L,
}

impl<'a, L: DatasetLookup> QueryParser<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Parses and validates a raw query into an immutable plan.
    pub fn parse(&self, raw: &Value) -> QueryResult<QueryPlan> {
        let query = as_object(raw, "Query")?;
        let has_transform = if has_exact_keys(query, &[FILTER, OPTIONS]) {
            false
        } else if has_exact_keys(query, &[FILTER, OPTIONS, TRANSFORM]) {
            true
        } else {
            return Err(QueryError::invalid_input(
                "Query must have exactly FILTER and OPTIONS, plus optional TRANSFORM",
            ));
        };

        let options = as_object(&query[OPTIONS], OPTIONS)?;
        if !has_exact_keys(options, &[COLUMNS]) && !has_exact_keys(options, &[COLUMNS, ORDER]) {
            return Err(QueryError::invalid_input(
                "OPTIONS must have COLUMNS and optional ORDER",
            ));
        }

        let columns = string_array(&options[COLUMNS], COLUMNS)?;
        let mut resolver = self.resolver_for(columns[0])?;

        let columns = columns
            .into_iter()
            .map(|column| Self::parse_column(&mut resolver, column, has_transform))
            .collect::<QueryResult<Vec<String>>>()?;

        let filter_object = as_object(&query[FILTER], FILTER)?;
        let filter = if filter_object.is_empty() {
            None
        } else {
            Some(Self::parse_filter(&mut resolver, &query[FILTER], false)?)
        };

        let sort = match options.get(ORDER) {
            Some(order) => Self::parse_order(&mut resolver, order)?,
            None => SortSpec::default(),
        };

        let (group, aggregates) = if has_transform {
            Self::parse_transform(&mut resolver, &query[TRANSFORM])?
        } else {
            (Vec::new(), Vec::new())
        };

        let dataset_id = resolver
            .dataset_id()
            .ok_or_else(|| QueryError::invalid_input("No dataset referenced in COLUMNS"))?
            .to_string();

        debug!(
            dataset = %dataset_id,
            columns = columns.len(),
            filtered = filter.is_some(),
            grouped = !group.is_empty(),
            "query parsed"
        );

        Ok(QueryPlan {
            dataset_id,
            filter,
            columns,
            sort,
            group,
            aggregates,
        })
    }

    /// Builds the resolver for the dataset named by the first column
    fn resolver_for(&self, first_column: &str) -> QueryResult<FieldResolver> {
        let (dataset_id, _) = split_key(first_column).map_err(|_| {
            QueryError::invalid_field(
                first_column,
                format!("First column '{}' must be a dataset field", first_column),
            )
        })?;

        let dataset = self.lookup.dataset(dataset_id).ok_or_else(|| {
            QueryError::invalid_field(
                first_column,
                format!("Dataset '{}' does not exist", dataset_id),
            )
        })?;

        let mut resolver = FieldResolver::new(dataset.kind());
        resolver.resolve(first_column)?;
        Ok(resolver)
    }

    /// A column is a dataset field, or (with TRANSFORM) an APPLY name
    fn parse_column(
        resolver: &mut FieldResolver,
        column: &str,
        has_transform: bool,
    ) -> QueryResult<String> {
        if column.is_empty() {
            return Err(QueryError::invalid_input("COLUMNS can not contain an empty string"));
        }
        if column.contains('_') {
            resolver.resolve(column)?;
        } else if !has_transform {
            return Err(QueryError::invalid_field(
                column,
                format!("Column '{}' is not a dataset field", column),
            ));
        }
        Ok(column.to_string())
    }

    /// Parses one filter object; `negated` carries enclosing NEGATEs.
    fn parse_filter(
        resolver: &mut FieldResolver,
        value: &Value,
        negated: bool,
    ) -> QueryResult<FilterNode> {
        let object = as_object(value, "Filter")?;
        let (key, body) = single_entry(object, "filter")?;

        if let Some(op) = ComparisonOp::from_key(key) {
            return Ok(FilterNode::Comparison(Self::parse_comparison(
                resolver, op, body, negated,
            )?));
        }

        if let Some(op) = LogicalOp::from_key(key) {
            let children = body
                .as_array()
                .filter(|a| !a.is_empty())
                .ok_or_else(|| {
                    QueryError::invalid_field(
                        key,
                        format!("{} must be a non-empty array", op.as_str()),
                    )
                })?;

            let mut composite = Composite {
                op,
                composites: Vec::new(),
                comparisons: Vec::new(),
                negated,
            };
            for child in children {
                match Self::parse_filter(resolver, child, false)? {
                    FilterNode::Comparison(c) => composite.comparisons.push(c),
                    FilterNode::Composite(c) => composite.composites.push(c),
                }
            }
            return Ok(FilterNode::Composite(composite));
        }

        if key == NEGATE {
            return Self::parse_filter(resolver, body, !negated);
        }

        Err(QueryError::invalid_field(
            key,
            format!("Invalid filter key '{}'", key),
        ))
    }

    fn parse_comparison(
        resolver: &mut FieldResolver,
        op: ComparisonOp,
        body: &Value,
        negated: bool,
    ) -> QueryResult<Comparison> {
        let object = as_object(body, op.as_str())?;
        let (key, value) = single_entry(object, op.as_str())?;
        let field = resolver.resolve_with_value(key, value)?;

        let operand = match (op, field.field_type(), value) {
            (ComparisonOp::LessThan | ComparisonOp::GreaterThan, FieldType::Numeric, Value::Number(n))
            | (ComparisonOp::Equals, FieldType::Numeric, Value::Number(n)) => {
                let n = n.as_f64().ok_or_else(|| {
                    QueryError::invalid_field(key, format!("Unrepresentable number {}", n))
                })?;
                Operand::Number(n)
            }
            (ComparisonOp::Equals, FieldType::Textual, Value::String(s)) => Operand::Text(s.clone()),
            (ComparisonOp::Matches, FieldType::Textual, Value::String(s)) => {
                let pattern = WildcardPattern::compile(s)
                    .map_err(|reason| QueryError::invalid_field(key, reason))?;
                Operand::Pattern(pattern)
            }
            _ => {
                return Err(QueryError::invalid_field(
                    key,
                    format!(
                        "{} can not be applied to {} field '{}'",
                        op.as_str(),
                        field.field_type().type_name(),
                        key
                    ),
                ));
            }
        };

        Ok(Comparison {
            field,
            op,
            operand,
            negated,
        })
    }

    /// ORDER keys may be dataset fields or APPLY names; membership in
    /// COLUMNS is checked when results are formatted.
    fn parse_order(resolver: &mut FieldResolver, order: &Value) -> QueryResult<SortSpec> {
        if let Some(key) = order.as_str() {
            Self::check_order_key(resolver, key)?;
            return Ok(SortSpec::asc(key));
        }

        let object = as_object(order, ORDER)?;
        if !has_exact_keys(object, &["dir", "keys"]) {
            return Err(QueryError::invalid_input(
                "ORDER must be a key or an object with exactly 'dir' and 'keys'",
            ));
        }

        let direction = object["dir"]
            .as_str()
            .and_then(SortDirection::from_key)
            .ok_or_else(|| {
                QueryError::invalid_input(format!(
                    "Invalid ORDER direction {}, expected ASCENDING or DESCENDING",
                    object["dir"]
                ))
            })?;

        let keys = string_array(&object["keys"], "ORDER keys")?;
        for key in &keys {
            Self::check_order_key(resolver, key)?;
        }

        Ok(SortSpec::new(
            direction,
            keys.into_iter().map(String::from).collect(),
        ))
    }

    fn check_order_key(resolver: &mut FieldResolver, key: &str) -> QueryResult<()> {
        if key.is_empty() {
            return Err(QueryError::invalid_input("ORDER key can not be empty"));
        }
        if key.contains('_') {
            resolver.resolve(key)?;
        }
        Ok(())
    }

    fn parse_transform(
        resolver: &mut FieldResolver,
        value: &Value,
    ) -> QueryResult<(Vec<FieldRef>, Vec<AggregateSpec>)> {
        let transform = as_object(value, TRANSFORM)?;
        if !has_exact_keys(transform, &[GROUP, APPLY]) {
            return Err(QueryError::invalid_input(
                "TRANSFORM must have exactly GROUP and APPLY",
            ));
        }

        let group = string_array(&transform[GROUP], GROUP)?
            .into_iter()
            .map(|key| resolver.resolve(key))
            .collect::<QueryResult<Vec<FieldRef>>>()?;

        let entries = transform[APPLY]
            .as_array()
            .ok_or_else(|| QueryError::invalid_input("APPLY must be an array"))?;

        let mut names = HashSet::new();
        let mut aggregates = Vec::with_capacity(entries.len());
        for entry in entries {
            let spec = Self::parse_apply_entry(resolver, entry)?;
            if !names.insert(spec.name.clone()) {
                return Err(QueryError::invalid_field(
                    &spec.name,
                    format!("Duplicate APPLY key '{}'", spec.name),
                ));
            }
            aggregates.push(spec);
        }

        Ok((group, aggregates))
    }

    /// `{ "<name>": { "<OP>": "<datasetId>_<field>" } }`
    fn parse_apply_entry(resolver: &mut FieldResolver, entry: &Value) -> QueryResult<AggregateSpec> {
        let outer = as_object(entry, "APPLY entry")?;
        let (name, rule) = single_entry(outer, "APPLY entry")?;

        if name.is_empty() || name.contains('_') {
            return Err(QueryError::invalid_field(
                name,
                format!("APPLY key '{}' must be non-empty and can not contain '_'", name),
            ));
        }

        let rule = as_object(rule, "APPLY rule")?;
        let (op_key, target) = single_entry(rule, "APPLY rule")?;
        let op = AggregateOp::from_key(op_key).ok_or_else(|| {
            QueryError::invalid_field(name, format!("Invalid APPLY operation '{}'", op_key))
        })?;
        let target_key = target.as_str().ok_or_else(|| {
            QueryError::invalid_field(name, format!("APPLY target must be a string, got {}", target))
        })?;

        let target = resolver.resolve(target_key)?;
        if op.requires_numeric() && !target.field.is_numeric() {
            return Err(QueryError::invalid_field(
                name,
                format!("Can not apply {} to non-numeric field '{}'", op, target_key),
            ));
        }

        Ok(AggregateSpec {
            name: name.to_string(),
            op,
            target,
        })
    }
}
