//! Dataset subsystem
//!
//! Records, datasets, and the dataset store the query engine reads from.
//! The engine only ever sees datasets through [`DatasetLookup`].

mod dataset;
mod errors;
mod record;
mod store;

pub use dataset::{is_valid_id, Dataset, DatasetSummary};
pub use errors::{StoreError, StoreResult};
pub use record::{FieldValue, Record, ResultRow};
pub use store::{DatasetLookup, DatasetStore};

#[cfg(test)]
pub(crate) use dataset::fixtures;
