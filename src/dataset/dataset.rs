//! Dataset construction and validation
//!
//! A dataset is validated once, when it is built. Queries read it
//! without re-checking record shapes.

use serde::{Deserialize, Serialize};

use crate::schema::SchemaKind;

use super::errors::{StoreError, StoreResult};
use super::record::Record;

/// A named, schema-tagged collection of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    id: String,
    kind: SchemaKind,
    records: Vec<Record>,
}

/// Listing entry for a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: String,
    pub kind: SchemaKind,
    pub num_rows: usize,
}

/// On-disk form, validated through [`Dataset::new`] when loaded
#[derive(Debug, Deserialize)]
pub(crate) struct RawDataset {
    pub id: String,
    pub kind: SchemaKind,
    pub records: Vec<Record>,
}

/// Returns true if `id` is usable as a dataset id.
///
/// Ids must be non-blank and must not contain `_`, which separates the
/// id from the field name in query keys.
pub fn is_valid_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains('_')
}

impl Dataset {
    /// Builds a dataset, checking the id and every record's shape.
    pub fn new(id: impl Into<String>, kind: SchemaKind, records: Vec<Record>) -> StoreResult<Self> {
        let id = id.into();
        if !is_valid_id(&id) {
            return Err(StoreError::InvalidId(id));
        }

        for (index, record) in records.iter().enumerate() {
            check_record(kind, record).map_err(|reason| StoreError::MalformedRecord {
                dataset: id.clone(),
                index,
                reason,
            })?;
        }

        Ok(Self { id, kind, records })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            id: self.id.clone(),
            kind: self.kind,
            num_rows: self.records.len(),
        }
    }
}

impl TryFrom<RawDataset> for Dataset {
    type Error = StoreError;

    fn try_from(raw: RawDataset) -> StoreResult<Self> {
        Dataset::new(raw.id, raw.kind, raw.records)
    }
}

/// A record is well-formed iff it has exactly the schema's fields,
/// each holding a value of the declared type.
fn check_record(kind: SchemaKind, record: &Record) -> Result<(), String> {
    for field in kind.fields() {
        match record.get(field.name()) {
            None => return Err(format!("missing field '{}'", field.name())),
            Some(value) if !field.field_type().matches(value) => {
                return Err(format!(
                    "field '{}' must be a {}",
                    field.name(),
                    field.field_type().type_name()
                ));
            }
            Some(_) => {}
        }
    }

    if record.len() != kind.field_count() {
        if let Some((extra, _)) = record.iter().find(|(name, _)| kind.field(name).is_none()) {
            return Err(format!("undeclared field '{}'", extra));
        }
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_id("courses"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("   "));
        assert!(!is_valid_id("my_courses"));
    }

    #[test]
    fn test_dataset_accepts_wellformed_records() {
        let ds = Dataset::new(
            "courses",
            SchemaKind::Courses,
            vec![section("cpsc", "310", 80.0, 2015.0)],
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.summary().num_rows, 1);
        assert_eq!(ds.kind(), SchemaKind::Courses);
    }

    #[test]
    fn test_dataset_rejects_wrong_kind() {
        let err = Dataset::new("rooms", SchemaKind::Rooms, vec![section("cpsc", "310", 80.0, 2015.0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn test_dataset_rejects_extra_field() {
        let record = section("cpsc", "310", 80.0, 2015.0).with("extra", 1.0);
        let err = Dataset::new("courses", SchemaKind::Courses, vec![record]).unwrap_err();
        assert!(err.to_string().contains("undeclared field 'extra'"));
    }

    #[test]
    fn test_dataset_rejects_wrong_type() {
        let record = section("cpsc", "310", 80.0, 2015.0).with("avg", "eighty");
        let err = Dataset::new("courses", SchemaKind::Courses, vec![record]).unwrap_err();
        assert!(err.to_string().contains("'avg' must be a number"));
    }

    #[test]
    fn test_dataset_rejects_invalid_id() {
        let err = Dataset::new("a_b", SchemaKind::Rooms, vec![]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[test]
    fn test_room_fixture_is_wellformed() {
        let ds = Dataset::new("rooms", SchemaKind::Rooms, vec![room("DMP", "110", 120.0, "Tables")]);
        assert!(ds.is_ok());
    }
}
