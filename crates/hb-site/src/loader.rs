//! Content loader: slug to storage location.
//!
//! Docs live at `docs/<slug>/index.mdx`, weekly posts at `week/<slug>.mdx`.
//! Slugs are checked here before any path is built; the storage backend
//! checks again that the resolved file stays inside the content root.

use std::fmt;
use std::sync::Arc;

use hb_storage::Storage;

use crate::error::DocsError;

/// Directory holding documentation pages.
pub const DOCS_DIR: &str = "docs";
/// File name of a documentation page inside its directory.
pub const DOCS_FILE: &str = "index.mdx";
/// Directory holding weekly posts.
pub const WEEKS_DIR: &str = "week";
/// Extension of weekly post files.
pub const WEEK_EXTENSION: &str = "mdx";

/// A validated `/`-delimited content path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// Validate a slug.
    ///
    /// Rejects empty slugs, leading or trailing slashes, empty, `.` and `..`
    /// segments, backslashes, NUL and drive prefixes.
    pub fn parse(slug: &str) -> Result<Self, DocsError> {
        let invalid = |reason| DocsError::InvalidSlug {
            slug: slug.to_owned(),
            reason,
        };

        if slug.is_empty() {
            return Err(invalid("slug is empty"));
        }
        if slug.starts_with('/') || slug.ends_with('/') {
            return Err(invalid("leading or trailing slash"));
        }
        if slug.contains(['\\', '\0', ':']) {
            return Err(invalid("contains a forbidden character"));
        }
        for segment in slug.split('/') {
            match segment {
                "" => return Err(invalid("empty path segment")),
                "." | ".." => return Err(invalid("relative path segment")),
                _ => {}
            }
        }
        Ok(Self(slug.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage path of the documentation page.
    pub fn doc_path(&self) -> String {
        format!("{DOCS_DIR}/{}/{DOCS_FILE}", self.0)
    }

    /// Storage path of the weekly post.
    pub fn week_path(&self) -> String {
        format!("{WEEKS_DIR}/{}.{WEEK_EXTENSION}", self.0)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads raw content documents from storage.
#[derive(Clone)]
pub struct ContentLoader {
    storage: Arc<dyn Storage>,
}

impl ContentLoader {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Raw text of a documentation page.
    pub fn read_doc(&self, slug: &str) -> Result<String, DocsError> {
        let slug = Slug::parse(slug)?;
        self.read(&slug.doc_path(), slug.as_str())
    }

    /// Raw text of a weekly post.
    pub fn read_week(&self, slug: &str) -> Result<String, DocsError> {
        let slug = Slug::parse(slug)?;
        self.read(&slug.week_path(), slug.as_str())
    }

    /// File names in the weekly posts directory, sorted.
    pub fn list_weeks(&self) -> Result<Vec<String>, DocsError> {
        self.storage
            .list(WEEKS_DIR)
            .map_err(|e| DocsError::from_storage(e, WEEKS_DIR, WEEKS_DIR))
    }

    /// Raw text of a file in the weekly posts directory, by file name.
    pub(crate) fn read_week_file(&self, file_name: &str) -> Result<String, DocsError> {
        let path = format!("{WEEKS_DIR}/{file_name}");
        self.read(&path, file_name)
    }

    fn read(&self, path: &str, slug: &str) -> Result<String, DocsError> {
        tracing::trace!(path, "Reading content");
        self.storage
            .read(path)
            .map_err(|e| DocsError::from_storage(e, slug, path))
    }
}
