//! Dataset store
//!
//! Holds every known dataset in memory. When opened on a directory, each
//! dataset is persisted as `<dir>/<id>.json` and reloaded at startup.
//! Files that fail to parse, or whose name differs from the id they hold,
//! are skipped with a warning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::dataset::{is_valid_id, Dataset, DatasetSummary, RawDataset};
use super::errors::{StoreError, StoreResult};

/// Read-only access to datasets by id, as needed by the query engine
pub trait DatasetLookup {
    /// Returns the dataset with the given id, if it exists
    fn dataset(&self, id: &str) -> Option<&Dataset>;
}

impl DatasetLookup for HashMap<String, Dataset> {
    fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.get(id)
    }
}

/// In-memory dataset registry with optional on-disk persistence
#[derive(Debug, Default)]
pub struct DatasetStore {
    dir: Option<PathBuf>,
    datasets: HashMap<String, Dataset>,
}

impl DatasetStore {
    /// Creates a store that never touches disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a disk-backed store, loading every dataset file in `dir`.
    ///
    /// The directory is created if it does not exist.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut datasets = HashMap::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();

            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match Self::load_file(&path) {
                Ok(dataset) if dataset.id() != stem => {
                    warn!(
                        path = %path.display(),
                        id = dataset.id(),
                        "skipping dataset file whose name does not match its id"
                    );
                }
                Ok(dataset) => {
                    debug!(id = dataset.id(), rows = dataset.len(), "loaded dataset");
                    datasets.insert(dataset.id().to_string(), dataset);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable dataset file");
                }
            }
        }

        info!(dir = %dir.display(), count = datasets.len(), "dataset store opened");
        Ok(Self {
            dir: Some(dir),
            datasets,
        })
    }

    fn load_file(path: &Path) -> StoreResult<Dataset> {
        let content = fs::read_to_string(path)?;
        let raw: RawDataset = serde_json::from_str(&content)?;
        Dataset::try_from(raw)
    }

    fn file_path(&self, id: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{}.json", id)))
    }

    /// Adds a dataset and returns the ids of all known datasets, sorted.
    pub fn add(&mut self, dataset: Dataset) -> StoreResult<Vec<String>> {
        let id = dataset.id().to_string();
        if !is_valid_id(&id) {
            return Err(StoreError::InvalidId(id));
        }
        if self.datasets.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        if let Some(path) = self.file_path(&id) {
            let content = serde_json::to_string(&dataset)?;
            fs::write(&path, content)?;
        }

        info!(id = %id, kind = %dataset.kind(), rows = dataset.len(), "dataset added");
        self.datasets.insert(id, dataset);
        Ok(self.ids())
    }

    /// Removes a dataset and returns its id
    pub fn remove(&mut self, id: &str) -> StoreResult<String> {
        if !is_valid_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        if !self.datasets.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        if let Some(path) = self.file_path(id) {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }

        self.datasets.remove(id);
        info!(id = %id, "dataset removed");
        Ok(id.to_string())
    }

    /// Returns a dataset by id
    pub fn get(&self, id: &str) -> StoreResult<&Dataset> {
        self.datasets
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Lists all datasets, sorted by id
    pub fn list(&self) -> Vec<DatasetSummary> {
        let mut summaries: Vec<DatasetSummary> =
            self.datasets.values().map(Dataset::summary).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// All known dataset ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.datasets.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl DatasetLookup for DatasetStore {
    fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::dataset::fixtures::section;
    use crate::schema::SchemaKind;

    fn courses(id: &str) -> Dataset {
        Dataset::new(
            id,
            SchemaKind::Courses,
            vec![section("cpsc", "310", 80.0, 2015.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_add_and_list() {
        let mut store = DatasetStore::in_memory();
        assert_eq!(store.add(courses("b")).unwrap(), vec!["b".to_string()]);
        assert_eq!(
            store.add(courses("a")).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );

        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "a");
        assert_eq!(listed[0].kind, SchemaKind::Courses);
        assert_eq!(listed[0].num_rows, 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut store = DatasetStore::in_memory();
        store.add(courses("courses")).unwrap();
        let err = store.add(courses("courses")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn test_remove() {
        let mut store = DatasetStore::in_memory();
        store.add(courses("courses")).unwrap();

        assert_eq!(store.remove("courses").unwrap(), "courses");
        assert!(store.is_empty());
        assert!(store.remove("courses").unwrap_err().is_not_found());
        assert!(matches!(
            store.remove("bad_id").unwrap_err(),
            StoreError::InvalidId(_)
        ));
    }

    #[test]
    fn test_get_missing() {
        let store = DatasetStore::in_memory();
        assert!(store.get("nothing").unwrap_err().is_not_found());
        assert!(store.dataset("nothing").is_none());
    }
}
