//! Errors of the content services.

use hb_renderer::CompileError;
use hb_storage::{StorageError, StorageErrorKind};

/// Error returned by [`Docs`](crate::Docs) and [`Weeks`](crate::Weeks).
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// Slug does not resolve to a content file.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Slug is malformed or would leave the content root.
    #[error("Invalid slug `{slug}`: {reason}")]
    InvalidSlug { slug: String, reason: &'static str },

    /// Document exists but does not compile.
    #[error("Failed to compile `{slug}`: {source}")]
    Compilation {
        slug: String,
        #[source]
        source: CompileError,
    },

    /// Storage failed for a reason other than a missing file.
    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: StorageError,
    },

    /// A route declares a child page whose content file is missing.
    #[error("Child page {href} has no content file at {path}")]
    MissingChildContent { href: String, path: String },
}

impl DocsError {
    /// Whether the error should surface as "page not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidSlug { .. })
    }

    /// Classify a storage error for the document at `path` named by `slug`.
    pub(crate) fn from_storage(err: StorageError, slug: &str, path: &str) -> Self {
        match err.kind() {
            StorageErrorKind::NotFound => Self::NotFound(slug.to_owned()),
            StorageErrorKind::InvalidPath => Self::InvalidSlug {
                slug: slug.to_owned(),
                reason: "resolves outside the content root",
            },
            _ => Self::Io {
                path: path.to_owned(),
                source: err,
            },
        }
    }
}
