//! Result types for query execution

use crate::dataset::ResultRow;

/// Result of query execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Rows in result order, projected to the requested columns
    pub rows: Vec<ResultRow>,
    /// Number of records scanned
    pub scanned_count: usize,
    /// Number of records that passed the filter
    pub matched_count: usize,
}

impl ExecutionResult {
    /// Returns true if no rows were produced
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Consumes the result, returning its rows
    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FieldValue;

    #[test]
    fn test_empty_result() {
        let result = ExecutionResult::default();
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert_eq!(result.scanned_count, 0);
    }

    #[test]
    fn test_into_rows() {
        let mut row = ResultRow::new();
        row.push("rooms_seats", FieldValue::Number(40.0));
        let result = ExecutionResult {
            rows: vec![row.clone()],
            scanned_count: 3,
            matched_count: 1,
        };
        assert_eq!(result.len(), 1);
        assert_eq!(result.into_rows(), vec![row]);
    }
}
