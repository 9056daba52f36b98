//! Field schema subsystem
//!
//! Declares the two record schemas (courses, rooms) and resolves
//! dataset-qualified query keys against them.
//!
//! # Design Principles
//!
//! - Closed schemas: a record has exactly the declared fields
//! - Two value types only: numeric and textual
//! - One dataset id per query, fixed by the first resolved key

mod resolver;
mod types;

pub use resolver::{qualify, split_key, FieldRef, FieldResolver};
pub use types::{CourseField, Field, FieldType, RoomField, SchemaKind};
