//! Weekly posts service: a flat collection of `week/<slug>.mdx` files.

use std::sync::Arc;

use hb_renderer::{CompiledDocument, Compiler, extract_frontmatter};
use hb_storage::Storage;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::DocsError;
use crate::loader::{ContentLoader, WEEK_EXTENSION};
use crate::metadata::WeekFrontmatter;

/// A weekly post in a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeekEntry {
    pub slug: String,
    #[serde(flatten)]
    pub frontmatter: WeekFrontmatter,
}

/// Weekly posts content service.
pub struct Weeks {
    loader: ContentLoader,
    compiler: Compiler,
}

impl Weeks {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            loader: ContentLoader::new(storage),
            compiler: Compiler::new(),
        }
    }

    /// Slugs of every file in the posts directory (name up to the first dot).
    ///
    /// A missing directory is an empty collection.
    pub fn slugs(&self) -> Result<Vec<String>, DocsError> {
        Ok(self
            .file_names()?
            .iter()
            .map(String::as_str)
            .map(file_stem)
            .filter(|stem| !stem.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Frontmatter of every `.mdx` post, read concurrently, sorted by slug.
    pub fn all_frontmatter(&self) -> Result<Vec<WeekEntry>, DocsError> {
        let files: Vec<String> = self
            .file_names()?
            .into_iter()
            .filter(|name| has_post_extension(name) && !file_stem(name).is_empty())
            .collect();

        let mut entries = files
            .par_iter()
            .map(|name| -> Result<WeekEntry, DocsError> {
                let raw = self.loader.read_week_file(name)?;
                Ok(WeekEntry {
                    slug: file_stem(name).to_owned(),
                    frontmatter: extract_frontmatter(&raw),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        entries.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(entries)
    }

    /// Compile the post at `slug`.
    pub fn compile(&self, slug: &str) -> Result<CompiledDocument<WeekFrontmatter>, DocsError> {
        let raw = self.loader.read_week(slug)?;
        tracing::debug!(slug, "Compiling weekly post");
        self.compiler
            .compile(&raw)
            .map_err(|source| DocsError::Compilation {
                slug: slug.to_owned(),
                source,
            })
    }

    /// Frontmatter of the post at `slug`, without compiling the body.
    pub fn frontmatter(&self, slug: &str) -> Result<WeekFrontmatter, DocsError> {
        let raw = self.loader.read_week(slug)?;
        Ok(extract_frontmatter(&raw))
    }

    fn file_names(&self) -> Result<Vec<String>, DocsError> {
        match self.loader.list_weeks() {
            Ok(names) => Ok(names),
            Err(DocsError::NotFound(_)) => {
                tracing::debug!("No weekly posts directory");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

fn file_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or_default()
}

fn has_post_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext == WEEK_EXTENSION)
}

#[cfg(test)]
mod tests {
    use hb_storage::{MockStorage, StorageErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(Weeks: Send, Sync);

    fn weeks() -> Weeks {
        let storage = MockStorage::new()
            .with_file(
                "week/2.mdx",
                "---\ntitle: Week 2\ndate: 2024-03-08\nauthors:\n  - handle: ada\n    username: Ada\n    handleUrl: https://github.com/ada\n---\nBody 2\n",
            )
            .with_file("week/1.mdx", "---\ntitle: Week 1\nyoutube: abc\n---\n<YouTube videoId=\"abc\" />\n")
            .with_file("week/notes.txt", "not a post")
            .with_file("week/broken.mdx", "---\ntitle: [oops\n---\nBody\n");
        Weeks::new(Arc::new(storage))
    }

    #[test]
    fn test_slugs_include_every_file() {
        assert_eq!(weeks().slugs().unwrap(), vec!["1", "2", "broken", "notes"]);
    }

    #[test]
    fn test_all_frontmatter_only_mdx_sorted() {
        let entries = weeks().all_frontmatter().unwrap();

        let slugs: Vec<&str> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["1", "2", "broken"]);
        assert_eq!(entries[1].frontmatter.authors[0].username, "Ada");
        assert_eq!(entries[2].frontmatter, WeekFrontmatter::default());
    }

    #[test]
    fn test_compile_and_frontmatter() {
        let weeks = weeks();

        let compiled = weeks.compile("1").unwrap();
        assert_eq!(compiled.frontmatter.youtube.as_deref(), Some("abc"));
        assert!(compiled.to_html().contains("https://www.youtube.com/embed/abc"));
        assert_eq!(weeks.frontmatter("2").unwrap().date.as_deref(), Some("2024-03-08"));
    }

    #[test]
    fn test_compile_errors() {
        let weeks = weeks();

        assert!(weeks.compile("missing").unwrap_err().is_not_found());
        assert!(matches!(
            weeks.compile("broken"),
            Err(DocsError::Compilation { .. })
        ));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let weeks = Weeks::new(Arc::new(MockStorage::new()));

        assert!(weeks.slugs().unwrap().is_empty());
        assert!(weeks.all_frontmatter().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_directory_is_error() {
        let storage = MockStorage::new().with_error("week", StorageErrorKind::PermissionDenied);
        let weeks = Weeks::new(Arc::new(storage));

        assert!(matches!(weeks.slugs(), Err(DocsError::Io { .. })));
    }

    #[test]
    fn test_file_helpers() {
        assert_eq!(file_stem("1.mdx"), "1");
        assert_eq!(file_stem("a.b.mdx"), "a");
        assert!(has_post_extension("1.mdx"));
        assert!(!has_post_extension("1.md"));
        assert!(!has_post_extension("mdx"));
    }
}
