//! Documentation pages service.
//!
//! Every operation reads the document fresh from storage; nothing is cached
//! between calls. [`Docs::page`] is the rendering boundary where missing,
//! invalid and uncompilable documents all become "not found".

use std::collections::HashMap;
use std::sync::Arc;

use hb_renderer::{CompiledDocument, Compiler, TocEntry, extract_frontmatter, extract_toc};
use hb_storage::Storage;
use rayon::prelude::*;

use crate::error::DocsError;
use crate::loader::{ContentLoader, DOCS_DIR, DOCS_FILE};
use crate::metadata::DocFrontmatter;
use crate::navigation::{
    ChildPage, DOCS_URL_PREFIX, NavigationResult, breadcrumbs, prev_next, resolve_children,
};
use crate::page::{DocPage, PageMeta, expand_outlets, outlet_paths};
use crate::routes::RouteTable;

/// Documentation content service.
pub struct Docs {
    loader: ContentLoader,
    routes: Arc<RouteTable>,
    compiler: Compiler,
}

impl Docs {
    pub fn new(storage: Arc<dyn Storage>, routes: Arc<RouteTable>) -> Self {
        Self {
            loader: ContentLoader::new(storage),
            routes,
            compiler: Compiler::new(),
        }
    }

    /// Route table this service navigates.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Compile the page at `slug`.
    pub fn compile(&self, slug: &str) -> Result<CompiledDocument<DocFrontmatter>, DocsError> {
        let raw = self.loader.read_doc(slug)?;
        self.compile_raw(slug, &raw)
    }

    /// Frontmatter of the page at `slug`, without compiling the body.
    ///
    /// Malformed metadata yields an empty record.
    pub fn frontmatter(&self, slug: &str) -> Result<DocFrontmatter, DocsError> {
        let raw = self.loader.read_doc(slug)?;
        Ok(extract_frontmatter(&raw))
    }

    /// Table of contents of the page at `slug`.
    pub fn tocs(&self, slug: &str) -> Result<Vec<TocEntry>, DocsError> {
        let raw = self.loader.read_doc(slug)?;
        Ok(extract_toc(&raw))
    }

    /// Previous and next pages in route order.
    pub fn prev_next(&self, slug: &str) -> NavigationResult {
        prev_next(&self.routes, slug)
    }

    /// Child pages declared under `path` in the route table.
    ///
    /// Child documents are read concurrently. A declared child without a
    /// content file fails the whole listing.
    pub fn children(&self, path: &str) -> Result<Vec<ChildPage>, DocsError> {
        let scope = resolve_children(&self.routes, path);
        let prefix = scope.prefix.trim_start_matches('/');

        scope
            .items
            .par_iter()
            .map(|item| -> Result<ChildPage, DocsError> {
                let slug = format!("{prefix}{}", item.href);
                let href = format!("{DOCS_URL_PREFIX}/{slug}");
                let raw = self.loader.read_doc(&slug).map_err(|e| match e {
                    DocsError::NotFound(_) => DocsError::MissingChildContent {
                        href: href.clone(),
                        path: format!("{DOCS_DIR}/{slug}/{DOCS_FILE}"),
                    },
                    other => other,
                })?;
                Ok(ChildPage {
                    frontmatter: extract_frontmatter(&raw),
                    href,
                })
            })
            .collect()
    }

    /// Assemble the full page for `slug`.
    ///
    /// Returns `Ok(None)` for pages that should answer "not found": missing
    /// files, invalid slugs and documents that fail to compile (logged as
    /// authoring defects). Storage faults are returned as errors.
    pub fn page(&self, slug: &str) -> Result<Option<DocPage>, DocsError> {
        let raw = match self.loader.read_doc(slug) {
            Ok(raw) => raw,
            Err(e) => return not_found_boundary(slug, e),
        };
        let mut compiled = match self.compile_raw(slug, &raw) {
            Ok(compiled) => compiled,
            Err(e) => return not_found_boundary(slug, e),
        };

        let mut listings = HashMap::new();
        for path in outlet_paths(&compiled.tree) {
            if !listings.contains_key(&path) {
                let children = self.children(&path)?;
                listings.insert(path, children);
            }
        }
        expand_outlets(&mut compiled.tree, &listings);

        Ok(Some(DocPage {
            slug: slug.to_owned(),
            title: compiled.frontmatter.display_title().to_owned(),
            description: compiled.frontmatter.display_description().to_owned(),
            html: compiled.to_html(),
            toc: extract_toc(&raw),
            breadcrumbs: breadcrumbs(&self.routes, slug),
            navigation: self.prev_next(slug),
            warnings: compiled.warnings,
        }))
    }

    /// Title and description for the page head.
    pub fn page_meta(&self, slug: &str) -> PageMeta {
        match self.frontmatter(slug) {
            Ok(fm) => PageMeta {
                title: fm.display_title().to_owned(),
                description: fm.display_description().to_owned(),
            },
            Err(e) => {
                if !e.is_not_found() {
                    tracing::warn!(slug, error = %e, "Failed to read page metadata");
                }
                PageMeta::not_found()
            }
        }
    }

    /// Slugs of every addressable page, for static generation.
    pub fn static_slugs(&self) -> Vec<String> {
        self.routes
            .page_routes()
            .iter()
            .map(|route| route.slug().to_owned())
            .collect()
    }

    fn compile_raw(
        &self,
        slug: &str,
        raw: &str,
    ) -> Result<CompiledDocument<DocFrontmatter>, DocsError> {
        tracing::debug!(slug, "Compiling page");
        self.compiler
            .compile(raw)
            .map_err(|source| DocsError::Compilation {
                slug: slug.to_owned(),
                source,
            })
    }
}

/// Map an error at the page boundary: "not found" kinds become `None`.
fn not_found_boundary<T>(slug: &str, err: DocsError) -> Result<Option<T>, DocsError> {
    match err {
        DocsError::NotFound(_) | DocsError::InvalidSlug { .. } => {
            tracing::debug!(slug, error = %err, "Page not found");
            Ok(None)
        }
        DocsError::Compilation { .. } => {
            tracing::warn!(slug, error = %err, "Page failed to compile, answering not found");
            Ok(None)
        }
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use hb_storage::{MockStorage, StorageErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::routes::RouteNode;

    static_assertions::assert_impl_all!(Docs: Send, Sync);

    fn routes() -> Arc<RouteTable> {
        Arc::new(
            RouteTable::new(vec![
                RouteNode::new("/getting-started", "Getting Started")
                    .with_item(RouteNode::new("/introduction", "Introduction"))
                    .with_item(RouteNode::new("/installation", "Installation")),
                RouteNode::new("/faq", "FAQ"),
            ])
            .unwrap(),
        )
    }

    fn storage() -> MockStorage {
        MockStorage::new()
            .with_file(
                "docs/getting-started/index.mdx",
                "---\ntitle: Getting Started\ndescription: Begin\n---\n\n<Outlet path=\"getting-started\" />\n",
            )
            .with_file(
                "docs/getting-started/introduction/index.mdx",
                "---\ntitle: \"Intro\"\n---\n## Getting Started\n\nText.\n\n### Setup Steps\n\n```bash\nnpm i\n```\n",
            )
            .with_file(
                "docs/getting-started/installation/index.mdx",
                "---\ntitle: Installation\ndescription: Install it\n---\nInstall.\n",
            )
            .with_file("docs/faq/index.mdx", "No frontmatter here.\n")
    }

    fn docs_with(storage: MockStorage) -> Docs {
        Docs::new(Arc::new(storage), routes())
    }

    #[test]
    fn test_frontmatter_and_compile_agree() {
        let docs = docs_with(storage());

        for slug in docs.static_slugs() {
            let fm = docs.frontmatter(&slug).unwrap();
            let compiled = docs.compile(&slug).unwrap();
            assert_eq!(fm, compiled.frontmatter, "{slug}");
        }
    }

    #[test]
    fn test_compile_missing_is_not_found() {
        let docs = docs_with(storage());

        let err = docs.compile("nope").unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_tocs() {
        let docs = docs_with(storage());

        let toc = docs.tocs("getting-started/introduction").unwrap();

        assert_eq!(
            toc,
            vec![
                TocEntry {
                    level: 2,
                    text: "Getting Started".to_owned(),
                    href: "#getting-started".to_owned(),
                },
                TocEntry {
                    level: 3,
                    text: "Setup Steps".to_owned(),
                    href: "#setup-steps".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_children() {
        let docs = docs_with(storage());

        let children = docs.children("getting-started").unwrap();

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].href, "/docs/getting-started/introduction");
        assert_eq!(children[0].frontmatter.title.as_deref(), Some("Intro"));
        assert_eq!(children[1].href, "/docs/getting-started/installation");
    }

    #[test]
    fn test_children_truncation_and_root() {
        let docs = docs_with(storage());

        assert_eq!(docs.children("getting-started/unknown").unwrap().len(), 2);
        assert!(docs.children("unknown/getting-started").unwrap().is_empty());
        assert!(docs.children("").unwrap().is_empty());
    }

    #[test]
    fn test_children_missing_content_fails_listing() {
        let storage = MockStorage::new()
            .with_file("docs/getting-started/introduction/index.mdx", "---\ntitle: Intro\n---\n");
        let docs = docs_with(storage);

        let err = docs.children("getting-started").unwrap_err();

        assert!(matches!(
            err,
            DocsError::MissingChildContent { ref href, .. } if href == "/docs/getting-started/installation"
        ));
    }

    #[test]
    fn test_page_assembles_everything() {
        let docs = docs_with(storage());

        let page = docs.page("getting-started/introduction").unwrap().unwrap();

        assert_eq!(page.title, "Intro");
        assert_eq!(page.description, "No description available");
        assert_eq!(page.toc.len(), 2);
        assert!(page.html.contains(r#"<h2 id="getting-started">"#));
        assert!(page.html.contains(r#"raw="npm i"#));
        assert_eq!(
            page.navigation.prev.map(|p| p.href),
            Some("/getting-started".to_owned())
        );
        assert_eq!(
            page.navigation.next.map(|p| p.href),
            Some("/getting-started/installation".to_owned())
        );
        let titles: Vec<&str> = page.breadcrumbs.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Docs", "Getting Started", "Introduction"]);
    }

    #[test]
    fn test_page_expands_outlet() {
        let docs = docs_with(storage());

        let page = docs.page("getting-started").unwrap().unwrap();

        assert!(page.html.contains(r#"href="/docs/getting-started/installation""#));
        assert!(page.html.contains("Install it"));
    }

    #[test]
    fn test_page_not_found_cases() {
        let storage = storage().with_file("docs/broken/index.mdx", "<Accordion />\n");
        let docs = docs_with(storage);

        assert!(docs.page("missing").unwrap().is_none());
        assert!(docs.page("../etc").unwrap().is_none());
        assert!(docs.page("broken").unwrap().is_none());
    }

    #[test]
    fn test_page_with_numeric_title() {
        let storage = storage().with_file(
            "docs/faq/index.mdx",
            "---\ntitle: 2024\ndescription: false\n---\nAnswers.\n",
        );
        let docs = docs_with(storage);

        let fm = docs.frontmatter("faq").unwrap();
        let compiled = docs.compile("faq").unwrap();
        assert_eq!(fm, compiled.frontmatter);
        assert_eq!(fm.title.as_deref(), Some("2024"));

        let page = docs.page("faq").unwrap().unwrap();
        assert_eq!(page.title, "2024");
        assert_eq!(page.description, "false");
    }

    #[test]
    fn test_page_io_error_is_surfaced() {
        let storage = storage().with_error("docs/faq/index.mdx", StorageErrorKind::PermissionDenied);
        let docs = docs_with(storage);

        assert!(matches!(docs.page("faq"), Err(DocsError::Io { .. })));
    }

    #[test]
    fn test_page_meta() {
        let docs = docs_with(storage());

        assert_eq!(
            docs.page_meta("faq"),
            PageMeta {
                title: "Untitled Page".to_owned(),
                description: "No description available".to_owned(),
            }
        );
        assert_eq!(docs.page_meta("missing"), PageMeta::not_found());
    }

    #[test]
    fn test_static_slugs() {
        let docs = docs_with(storage());

        assert_eq!(
            docs.static_slugs(),
            vec![
                "getting-started",
                "getting-started/introduction",
                "getting-started/installation",
                "faq",
            ]
        );
    }

    #[test]
    fn test_with_fs_storage() {
        let dir = tempfile::tempdir().unwrap();
        let page_dir = dir.path().join("docs/faq");
        std::fs::create_dir_all(&page_dir).unwrap();
        std::fs::write(page_dir.join("index.mdx"), "---\ntitle: FAQ\n---\n## Why\n").unwrap();
        let docs = Docs::new(Arc::new(hb_storage::FsStorage::new(dir.path())), routes());

        let page = docs.page("faq").unwrap().unwrap();

        assert_eq!(page.title, "FAQ");
        assert_eq!(page.toc[0].href, "#why");
    }
}
