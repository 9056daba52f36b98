//! Result sorting for query execution
//!
//! Multi-key sort over result rows. The first key whose values differ
//! decides; direction flips the whole comparison.

use std::cmp::Ordering;

use crate::dataset::{FieldValue, ResultRow};
use crate::planner::{SortDirection, SortSpec};

/// Sorts result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts rows according to the sort specification.
    ///
    /// Sort is stable: rows equal on every key keep their relative order.
    pub fn sort(rows: &mut [ResultRow], sort_spec: &SortSpec) {
        if sort_spec.is_empty() {
            return;
        }

        rows.sort_by(|a, b| {
            let ordering = Self::compare_rows(a, b, &sort_spec.keys);

            match sort_spec.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    fn compare_rows(a: &ResultRow, b: &ResultRow, keys: &[String]) -> Ordering {
        keys.iter()
            .map(|key| Self::compare_values(a.get(key), b.get(key)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Missing values sort first
    fn compare_values(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.compare(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(dept: &str, avg: f64, tag: &str) -> ResultRow {
        let mut row = ResultRow::new();
        row.push("courses_dept", FieldValue::from(dept));
        row.push("courses_avg", FieldValue::Number(avg));
        row.push("tag", FieldValue::from(tag));
        row
    }

    fn tags(rows: &[ResultRow]) -> Vec<&str> {
        rows.iter()
            .map(|r| r.get("tag").and_then(FieldValue::as_text).unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_sort_ascending() {
        let mut rows = vec![
            make_row("c", 30.0, "c"),
            make_row("a", 20.0, "a"),
            make_row("b", 25.0, "b"),
        ];

        ResultSorter::sort(&mut rows, &SortSpec::asc("courses_avg"));

        assert_eq!(tags(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_descending_text() {
        let mut rows = vec![
            make_row("b", 1.0, "b"),
            make_row("c", 1.0, "c"),
            make_row("a", 1.0, "a"),
        ];

        let spec = SortSpec::new(SortDirection::Descending, vec!["courses_dept".to_string()]);
        ResultSorter::sort(&mut rows, &spec);

        assert_eq!(tags(&rows), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_multi_key() {
        let mut rows = vec![
            make_row("math", 70.0, "m70"),
            make_row("cpsc", 80.0, "c80"),
            make_row("cpsc", 90.0, "c90"),
        ];

        let spec = SortSpec::new(
            SortDirection::Ascending,
            vec!["courses_dept".to_string(), "courses_avg".to_string()],
        );
        ResultSorter::sort(&mut rows, &spec);
        assert_eq!(tags(&rows), vec!["c80", "c90", "m70"]);

        let spec = SortSpec::new(
            SortDirection::Descending,
            vec!["courses_dept".to_string(), "courses_avg".to_string()],
        );
        ResultSorter::sort(&mut rows, &spec);
        assert_eq!(tags(&rows), vec!["m70", "c90", "c80"]);
    }

    #[test]
    fn test_sort_stable() {
        // Same avg, original order preserved
        let mut rows = vec![
            make_row("x", 25.0, "a"),
            make_row("y", 25.0, "b"),
            make_row("z", 25.0, "c"),
        ];

        ResultSorter::sort(&mut rows, &SortSpec::asc("courses_avg"));
        assert_eq!(tags(&rows), vec!["a", "b", "c"]);

        let spec = SortSpec::new(SortDirection::Descending, vec!["courses_avg".to_string()]);
        ResultSorter::sort(&mut rows, &spec);
        assert_eq!(tags(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_keys_keeps_order() {
        let mut rows = vec![make_row("b", 2.0, "b"), make_row("a", 1.0, "a")];
        ResultSorter::sort(&mut rows, &SortSpec::default());
        assert_eq!(tags(&rows), vec!["b", "a"]);
    }
}
