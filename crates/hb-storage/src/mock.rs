//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, HashMap};

use crate::storage::{Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// In-memory storage for tests.
///
/// # Example
///
/// ```ignore
/// use hb_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("docs/intro/index.mdx", "---\ntitle: Intro\n---\n# Intro");
///
/// let raw = storage.read("docs/intro/index.mdx").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: BTreeMap<String, String>,
    failures: HashMap<String, StorageErrorKind>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Make every read of `path` fail with the given kind.
    #[must_use]
    pub fn with_error(mut self, path: impl Into<String>, kind: StorageErrorKind) -> Self {
        self.failures.insert(path.into(), kind);
        self
    }

    fn check_failure(&self, path: &str) -> Result<(), StorageError> {
        match self.failures.get(path) {
            Some(kind) => Err(StorageError::new(*kind)
                .with_path(path)
                .with_backend(BACKEND)),
            None => Ok(()),
        }
    }
}

impl Storage for MockStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        self.check_failure(path)?;
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        self.check_failure(dir)?;
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let names: Vec<String> = self
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_owned)
            .collect();

        if names.is_empty() {
            return Err(StorageError::not_found(dir).with_backend(BACKEND));
        }
        Ok(names)
    }
}
