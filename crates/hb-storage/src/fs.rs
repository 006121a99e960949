//! Filesystem storage implementation.
//!
//! [`FsStorage`] treats the content root as a trust boundary: every path is
//! checked lexically and then again after symlink resolution before any
//! bytes are read.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Storage, StorageError};

const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a content directory.
///
/// ```ignore
/// use hb_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new("contents");
/// let raw = storage.read("week/1.mdx")?;
/// ```
#[derive(Clone, Debug)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `path` to a canonical location inside the root.
    ///
    /// Absolute paths, `..` components and NUL bytes are rejected before the
    /// filesystem is touched. Symlinks are then followed, so a link pointing
    /// outside the root is rejected even though its own path looks harmless.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let lexically_unsafe = path.contains('\0')
            || Path::new(path).components().any(|c| {
                matches!(
                    c,
                    Component::ParentDir | Component::RootDir | Component::Prefix(_)
                )
            });
        if lexically_unsafe {
            return Err(StorageError::invalid_path(path).with_backend(BACKEND));
        }

        let requested = self.root.join(path);
        let resolved = requested
            .canonicalize()
            .map_err(|e| io_error(e, &requested))?;
        let root = self.root.canonicalize().map_err(|e| io_error(e, &self.root))?;

        if !resolved.starts_with(&root) {
            tracing::warn!(path, resolved = %resolved.display(), "Path escapes content root");
            return Err(StorageError::invalid_path(path).with_backend(BACKEND));
        }
        Ok(resolved)
    }
}

fn io_error(err: io::Error, path: &Path) -> StorageError {
    StorageError::from_io(err, path).with_backend(BACKEND)
}

impl Storage for FsStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        let file = self.resolve(path)?;
        tracing::debug!(path, "Reading content file");
        fs::read_to_string(&file).map_err(|e| io_error(e, &file))
    }

    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let dir_path = self.resolve(dir)?;
        if !dir_path.is_dir() {
            return Err(StorageError::invalid_path(dir).with_backend(BACKEND));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir_path).map_err(|e| io_error(e, &dir_path))? {
            let entry = entry.map_err(|e| io_error(e, &dir_path))?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
