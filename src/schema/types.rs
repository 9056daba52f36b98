//! Field schema definitions
//!
//! Two record kinds are supported:
//! - courses: one row per course section
//! - rooms: one row per bookable room
//!
//! Every field is either numeric or textual. There are no nested
//! or optional fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::FieldValue;

/// Value type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Stored and compared as a number
    Numeric,
    /// Stored and compared as a string
    Textual,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Numeric => "number",
            FieldType::Textual => "string",
        }
    }

    /// Returns true if the raw JSON value has this type
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            FieldType::Numeric => value.is_number(),
            FieldType::Textual => value.is_string(),
        }
    }

    /// Returns true if the stored value has this type
    pub fn matches(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldType::Numeric, FieldValue::Number(_)) | (FieldType::Textual, FieldValue::Text(_))
        )
    }
}

/// Fields of a course section record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseField {
    Avg,
    Pass,
    Fail,
    Audit,
    Year,
    Dept,
    Id,
    Instructor,
    Title,
    Uuid,
}

impl CourseField {
    pub const ALL: [CourseField; 10] = [
        CourseField::Avg,
        CourseField::Pass,
        CourseField::Fail,
        CourseField::Audit,
        CourseField::Year,
        CourseField::Dept,
        CourseField::Id,
        CourseField::Instructor,
        CourseField::Title,
        CourseField::Uuid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CourseField::Avg => "avg",
            CourseField::Pass => "pass",
            CourseField::Fail => "fail",
            CourseField::Audit => "audit",
            CourseField::Year => "year",
            CourseField::Dept => "dept",
            CourseField::Id => "id",
            CourseField::Instructor => "instructor",
            CourseField::Title => "title",
            CourseField::Uuid => "uuid",
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            CourseField::Avg
            | CourseField::Pass
            | CourseField::Fail
            | CourseField::Audit
            | CourseField::Year => FieldType::Numeric,
            CourseField::Dept
            | CourseField::Id
            | CourseField::Instructor
            | CourseField::Title
            | CourseField::Uuid => FieldType::Textual,
        }
    }
}

/// Fields of a room record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomField {
    Fullname,
    Shortname,
    Number,
    Name,
    Address,
    Lat,
    Lon,
    Seats,
    Type,
    Furniture,
    Href,
}

impl RoomField {
    pub const ALL: [RoomField; 11] = [
        RoomField::Fullname,
        RoomField::Shortname,
        RoomField::Number,
        RoomField::Name,
        RoomField::Address,
        RoomField::Lat,
        RoomField::Lon,
        RoomField::Seats,
        RoomField::Type,
        RoomField::Furniture,
        RoomField::Href,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RoomField::Fullname => "fullname",
            RoomField::Shortname => "shortname",
            RoomField::Number => "number",
            RoomField::Name => "name",
            RoomField::Address => "address",
            RoomField::Lat => "lat",
            RoomField::Lon => "lon",
            RoomField::Seats => "seats",
            RoomField::Type => "type",
            RoomField::Furniture => "furniture",
            RoomField::Href => "href",
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            RoomField::Lat | RoomField::Lon | RoomField::Seats => FieldType::Numeric,
            _ => FieldType::Textual,
        }
    }
}

/// A declared field of either schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Course(CourseField),
    Room(RoomField),
}

impl Field {
    /// Unqualified field name as stored in records
    pub fn name(&self) -> &'static str {
        match self {
            Field::Course(f) => f.name(),
            Field::Room(f) => f.name(),
        }
    }

    /// Declared value type
    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Course(f) => f.field_type(),
            Field::Room(f) => f.field_type(),
        }
    }

    /// Returns true if the field holds numbers
    pub fn is_numeric(&self) -> bool {
        self.field_type() == FieldType::Numeric
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Schema variant tag carried by every dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Courses,
    Rooms,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Courses => "courses",
            SchemaKind::Rooms => "rooms",
        }
    }

    /// Parses a kind name (`courses` or `rooms`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "courses" => Some(SchemaKind::Courses),
            "rooms" => Some(SchemaKind::Rooms),
            _ => None,
        }
    }

    /// All fields declared by this schema, in declaration order
    pub fn fields(&self) -> Vec<Field> {
        match self {
            SchemaKind::Courses => CourseField::ALL.iter().map(|f| Field::Course(*f)).collect(),
            SchemaKind::Rooms => RoomField::ALL.iter().map(|f| Field::Room(*f)).collect(),
        }
    }

    /// Looks up a declared field by its unqualified name
    pub fn field(&self, name: &str) -> Option<Field> {
        match self {
            SchemaKind::Courses => CourseField::ALL
                .iter()
                .find(|f| f.name() == name)
                .map(|f| Field::Course(*f)),
            SchemaKind::Rooms => RoomField::ALL
                .iter()
                .find(|f| f.name() == name)
                .map(|f| Field::Room(*f)),
        }
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        match self {
            SchemaKind::Courses => CourseField::ALL.len(),
            SchemaKind::Rooms => RoomField::ALL.len(),
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
