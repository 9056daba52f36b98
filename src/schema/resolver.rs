//! Field reference resolution
//!
//! Query keys are written as `<datasetId>_<field>`. The resolver splits
//! the key, checks the field against the active schema and pins the
//! dataset id on first use. Every later key must carry the same id.

use crate::planner::{QueryError, QueryResult};

use super::types::{Field, FieldType, SchemaKind};

/// A validated, dataset-qualified field reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Dataset id prefix
    pub dataset_id: String,
    /// Declared field
    pub field: Field,
}

impl FieldRef {
    /// Returns the qualified key (`<datasetId>_<field>`)
    pub fn key(&self) -> String {
        qualify(&self.dataset_id, self.field.name())
    }

    /// Declared value type
    pub fn field_type(&self) -> FieldType {
        self.field.field_type()
    }
}

/// Joins a dataset id and a field name into a query key
pub fn qualify(dataset_id: &str, field: &str) -> String {
    format!("{}_{}", dataset_id, field)
}

/// Splits `<datasetId>_<field>`; requires exactly one underscore
pub fn split_key(key: &str) -> QueryResult<(&str, &str)> {
    let mut parts = key.split('_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(field), None) => Ok((id, field)),
        _ => Err(QueryError::invalid_field(
            key,
            format!("Expected exactly one '_' in key '{}'", key),
        )),
    }
}

/// Resolves query keys against one schema variant
#[derive(Debug, Clone)]
pub struct FieldResolver {
    kind: SchemaKind,
    dataset_id: Option<String>,
}

impl FieldResolver {
    /// Creates a resolver with no dataset id fixed yet
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            dataset_id: None,
        }
    }

    /// Creates a resolver with the dataset id already fixed
    pub fn for_dataset(kind: SchemaKind, dataset_id: impl Into<String>) -> Self {
        Self {
            kind,
            dataset_id: Some(dataset_id.into()),
        }
    }

    /// The dataset id fixed for this query, if any key has been resolved
    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    /// Resolves a qualified key into a field reference.
    ///
    /// The first successful resolution fixes the dataset id.
    pub fn resolve(&mut self, key: &str) -> QueryResult<FieldRef> {
        let (id, name) = split_key(key)?;

        if let Some(ref fixed) = self.dataset_id {
            if fixed != id {
                return Err(QueryError::invalid_field(
                    key,
                    format!("Query references multiple dataset ids '{}' and '{}'", fixed, id),
                ));
            }
        }

        let field = self.kind.field(name).ok_or_else(|| {
            QueryError::invalid_field(
                key,
                format!("Unknown {} field '{}'", self.kind, name),
            )
        })?;

        let dataset_id = self.dataset_id.get_or_insert_with(|| id.to_string()).clone();
        Ok(FieldRef { dataset_id, field })
    }

    /// Declared value type of a resolved field
    pub fn type_of(&self, field: Field) -> FieldType {
        field.field_type()
    }

    /// Resolves a key and checks that `value` matches the field's type
    pub fn resolve_with_value(
        &mut self,
        key: &str,
        value: &serde_json::Value,
    ) -> QueryResult<FieldRef> {
        let field_ref = self.resolve(key)?;
        let expected = self.type_of(field_ref.field);
        if !expected.accepts(value) {
            return Err(QueryError::invalid_field(
                key,
                format!(
                    "Invalid value {} for field '{}': expected {}",
                    value,
                    field_ref.field,
                    expected.type_name()
                ),
            ));
        }
        Ok(field_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{CourseField, RoomField};
    use serde_json::json;

    #[test]
    fn test_resolve_fixes_dataset_id() {
        let mut resolver = FieldResolver::new(SchemaKind::Courses);
        assert!(resolver.dataset_id().is_none());

        let r = resolver.resolve("courses_avg").unwrap();
        assert_eq!(r.field, Field::Course(CourseField::Avg));
        assert_eq!(r.key(), "courses_avg");
        assert_eq!(resolver.dataset_id(), Some("courses"));
    }

    #[test]
    fn test_multiple_dataset_ids_rejected() {
        let mut resolver = FieldResolver::new(SchemaKind::Courses);
        resolver.resolve("courses_avg").unwrap();

        let err = resolver.resolve("other_avg").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.message().contains("multiple dataset ids"));
    }

    #[test]
    fn test_underscore_count() {
        let mut resolver = FieldResolver::new(SchemaKind::Courses);
        assert!(resolver.resolve("coursesavg").is_err());
        assert!(resolver.resolve("courses_avg_x").is_err());
        assert!(resolver.resolve("_").is_err());
    }

    #[test]
    fn test_field_must_belong_to_schema() {
        let mut resolver = FieldResolver::for_dataset(SchemaKind::Rooms, "rooms");
        assert!(resolver.resolve("rooms_avg").is_err());
        let r = resolver.resolve("rooms_seats").unwrap();
        assert_eq!(r.field, Field::Room(RoomField::Seats));
    }

    #[test]
    fn test_failed_resolution_does_not_fix_id() {
        let mut resolver = FieldResolver::new(SchemaKind::Courses);
        assert!(resolver.resolve("courses_nope").is_err());
        assert!(resolver.dataset_id().is_none());
    }

    #[test]
    fn test_value_type_check() {
        let mut resolver = FieldResolver::new(SchemaKind::Courses);
        assert!(resolver.resolve_with_value("courses_avg", &json!(90)).is_ok());
        assert!(resolver.resolve_with_value("courses_avg", &json!("90")).is_err());
        assert!(resolver.resolve_with_value("courses_dept", &json!("cpsc")).is_ok());
        assert!(resolver.resolve_with_value("courses_dept", &json!(1)).is_err());
    }
}
