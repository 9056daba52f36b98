//! Result formatting
//!
//! Turns the filtered record set into output rows.
//!
//! Steps (strict order):
//! 1. Validate COLUMNS against GROUP and APPLY (grouped queries only)
//! 2. Group and aggregate, or qualify every field of each record
//! 3. Enforce the result cap
//! 4. Validate ORDER keys against COLUMNS and sort
//! 5. Project to COLUMNS, in order

use crate::dataset::{Record, ResultRow};
use crate::planner::{QueryError, QueryPlan, QueryResult};
use crate::schema::qualify;

use super::aggregate::GroupAggregator;
use super::sorter::ResultSorter;

/// Formats filtered records according to a plan
pub struct ResultFormatter<'p> {
    plan: &'p QueryPlan,
    max_results: usize,
}

impl<'p> ResultFormatter<'p> {
    pub fn new(plan: &'p QueryPlan, max_results: usize) -> Self {
        Self { plan, max_results }
    }

    pub fn format(&self, records: &[&Record]) -> QueryResult<Vec<ResultRow>> {
        self.validate_columns()?;

        let mut rows = if self.plan.is_grouped() {
            GroupAggregator::new(self.plan, self.max_results).aggregate(records)?
        } else {
            self.check_cap(records.len())?;
            records.iter().map(|record| self.qualify_record(record)).collect()
        };

        self.check_cap(rows.len())?;

        self.validate_sort_keys()?;
        ResultSorter::sort(&mut rows, &self.plan.sort);

        rows.iter().map(|row| self.project(row)).collect()
    }

    /// In a grouped query every column is a GROUP key or an APPLY name
    fn validate_columns(&self) -> QueryResult<()> {
        if !self.plan.is_grouped() {
            return Ok(());
        }

        for column in &self.plan.columns {
            let in_group = self.plan.group.iter().any(|field| field.key() == *column);
            let in_apply = self.plan.aggregates.iter().any(|spec| spec.name == *column);
            if !in_group && !in_apply {
                return Err(QueryError::invalid_field(
                    column,
                    format!("'{}' key in COLUMNS must be present in GROUP or APPLY", column),
                ));
            }
        }
        Ok(())
    }

    fn validate_sort_keys(&self) -> QueryResult<()> {
        for key in &self.plan.sort.keys {
            if !self.plan.columns.contains(key) {
                return Err(QueryError::invalid_field(
                    key,
                    format!("ORDER key '{}' is not included in COLUMNS", key),
                ));
            }
        }
        Ok(())
    }

    fn check_cap(&self, count: usize) -> QueryResult<()> {
        if count > self.max_results {
            return Err(QueryError::result_too_large(self.max_results));
        }
        Ok(())
    }

    fn qualify_record(&self, record: &Record) -> ResultRow {
        let mut row = ResultRow::with_capacity(record.len());
        for (name, value) in record.iter() {
            row.push(qualify(&self.plan.dataset_id, name), value.clone());
        }
        row
    }

    fn project(&self, row: &ResultRow) -> QueryResult<ResultRow> {
        let mut projected = ResultRow::with_capacity(self.plan.columns.len());
        for column in &self.plan.columns {
            let value = row.get(column).ok_or_else(|| {
                QueryError::invalid_field(column, format!("Column '{}' has no value", column))
            })?;
            projected.push(column.clone(), value.clone());
        }
        Ok(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::section;
    use crate::dataset::FieldValue;
    use crate::planner::{AggregateOp, AggregateSpec, SortDirection, SortSpec};
    use crate::schema::{CourseField, Field, FieldRef};

    fn field(f: CourseField) -> FieldRef {
        FieldRef {
            dataset_id: "courses".to_string(),
            field: Field::Course(f),
        }
    }

    fn plain_plan(columns: &[&str], sort: SortSpec) -> QueryPlan {
        QueryPlan {
            dataset_id: "courses".to_string(),
            filter: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            sort,
            group: Vec::new(),
            aggregates: Vec::new(),
        }
    }

    fn grouped_plan(columns: &[&str]) -> QueryPlan {
        QueryPlan {
            group: vec![field(CourseField::Dept)],
            aggregates: vec![AggregateSpec {
                name: "maxAvg".to_string(),
                op: AggregateOp::Max,
                target: field(CourseField::Avg),
            }],
            ..plain_plan(columns, SortSpec::asc("maxAvg"))
        }
    }

    fn records() -> Vec<Record> {
        vec![
            section("math", "100", 70.0, 2015.0),
            section("cpsc", "310", 90.0, 2015.0),
            section("cpsc", "210", 80.0, 2016.0),
        ]
    }

    #[test]
    fn test_projection_keeps_column_order() {
        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        let plan = plain_plan(&["courses_avg", "courses_dept"], SortSpec::asc("courses_avg"));

        let rows = ResultFormatter::new(&plan, 5000).format(&refs).unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.columns().collect::<Vec<_>>(), vec!["courses_avg", "courses_dept"]);
        }
        assert_eq!(rows[0].get("courses_avg"), Some(&FieldValue::Number(70.0)));
        assert_eq!(rows[2].get("courses_avg"), Some(&FieldValue::Number(90.0)));
    }

    #[test]
    fn test_grouped_output() {
        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        let plan = grouped_plan(&["courses_dept", "maxAvg"]);

        let rows = ResultFormatter::new(&plan, 5000).format(&refs).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("courses_dept"), Some(&FieldValue::from("math")));
        assert_eq!(rows[1].get("maxAvg"), Some(&FieldValue::Number(90.0)));
    }

    #[test]
    fn test_grouped_column_must_be_group_or_apply() {
        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        let plan = grouped_plan(&["courses_dept", "courses_avg"]);

        let err = ResultFormatter::new(&plan, 5000).format(&refs).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.field(), Some("courses_avg"));
    }

    #[test]
    fn test_order_key_must_be_in_columns() {
        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        let plan = plain_plan(
            &["courses_dept"],
            SortSpec::new(SortDirection::Descending, vec!["courses_avg".to_string()]),
        );

        let err = ResultFormatter::new(&plan, 5000).format(&refs).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_cap_boundary() {
        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        let plan = plain_plan(&["courses_dept"], SortSpec::default());

        assert_eq!(ResultFormatter::new(&plan, 3).format(&refs).unwrap().len(), 3);
        let err = ResultFormatter::new(&plan, 2).format(&refs).unwrap_err();
        assert!(err.is_result_too_large());
    }

    #[test]
    fn test_cap_reported_before_order_errors() {
        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        let plan = plain_plan(&["courses_dept"], SortSpec::asc("courses_avg"));

        let err = ResultFormatter::new(&plan, 1).format(&refs).unwrap_err();
        assert!(err.is_result_too_large());
    }
}
