//! Storage trait and error types.
//!
//! All paths passed to [`Storage`] are `/`-separated paths relative to the
//! content root, e.g. `docs/getting-started/index.mdx` or `week/1.mdx`.
//! Mapping logical slugs to these paths is the caller's job.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// What went wrong, independent of the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    NotFound,
    PermissionDenied,
    /// Malformed, or resolves outside the content root.
    InvalidPath,
    Other,
}

impl StorageErrorKind {
    fn label(self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::PermissionDenied => "Permission denied",
            Self::InvalidPath => "Invalid path",
            Self::Other => "Storage failure",
        }
    }
}

impl From<io::ErrorKind> for StorageErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Other,
        }
    }
}

/// Error from a [`Storage`] backend.
///
/// Carries the semantic [`StorageErrorKind`] callers branch on, plus the
/// offending path and backend name for messages.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    path: Option<PathBuf>,
    backend: Option<&'static str>,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl StorageError {
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Shorthand for a [`StorageErrorKind::NotFound`] error at `path`.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Shorthand for a [`StorageErrorKind::InvalidPath`] error at `path`.
    #[must_use]
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::InvalidPath).with_path(path)
    }

    /// Wrap an I/O error on `path`, classifying it by its [`io::ErrorKind`].
    #[must_use]
    pub fn from_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::new(err.kind().into())
            .with_path(path)
            .with_source(err)
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Name of the backend that failed (`Fs`, `Mock`).
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl fmt::Display for StorageError {
    /// `[Fs] Not found: <source> (path: week/1.mdx)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }
        f.write_str(self.kind.label())?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|s| s as &(dyn Error + 'static))
    }
}

/// Read-only access to raw content files.
///
/// Implementations must be safe to share across threads: listings read many
/// documents in parallel through the same storage.
pub trait Storage: Send + Sync {
    /// Read a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// [`StorageErrorKind::NotFound`] when the file does not exist,
    /// [`StorageErrorKind::InvalidPath`] when the path is rejected, and other
    /// kinds for I/O failures.
    fn read(&self, path: &str) -> Result<String, StorageError>;

    /// File names directly inside `dir`, sorted.
    ///
    /// Subdirectories are not included.
    fn list(&self, dir: &str) -> Result<Vec<String>, StorageError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_not_found_carries_path() {
        let err = StorageError::not_found("docs/intro/index.mdx");

        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(Path::new("docs/intro/index.mdx")));
        assert!(err.backend().is_none());
    }

    #[test]
    fn test_from_io_classifies_kind() {
        let cases = [
            (io::ErrorKind::NotFound, StorageErrorKind::NotFound),
            (io::ErrorKind::PermissionDenied, StorageErrorKind::PermissionDenied),
            (io::ErrorKind::InvalidData, StorageErrorKind::Other),
        ];

        for (io_kind, expected) in cases {
            let err = StorageError::from_io(io::Error::new(io_kind, "boom"), "a.mdx");
            assert_eq!(err.kind(), expected);
            assert!(err.source().is_some());
        }
    }

    #[test]
    fn test_display_kind_only() {
        let err = StorageError::new(StorageErrorKind::InvalidPath);

        assert_eq!(err.to_string(), "Invalid path");
    }

    #[test]
    fn test_display_with_context() {
        let err = StorageError::from_io(
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
            "week/1.mdx",
        )
        .with_backend("Fs");

        assert_eq!(
            err.to_string(),
            "[Fs] Not found: no such file (path: week/1.mdx)"
        );
    }

    #[test]
    fn test_storage_error_is_send_sync() {
        static_assertions::assert_impl_all!(StorageError: Send, Sync);
    }
}
