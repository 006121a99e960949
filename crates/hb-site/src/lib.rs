//! Route table, navigation and content services for Homebase.
//!
//! This crate provides:
//! - [`RouteTable`]: the validated, immutable tree of documentation pages
//! - [`Docs`]: compile, frontmatter, TOC, prev/next, children and full page
//!   assembly for `docs/<slug>/index.mdx` documents
//! - [`Weeks`]: the flat `week/<slug>.mdx` post collection
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use hb_site::{Docs, RouteNode, RouteTable};
//! use hb_storage::FsStorage;
//!
//! let routes = RouteTable::new(vec![
//!     RouteNode::new("/getting-started", "Getting Started")
//!         .with_item(RouteNode::new("/installation", "Installation")),
//! ])?;
//! let docs = Docs::new(Arc::new(FsStorage::new("contents")), Arc::new(routes));
//!
//! match docs.page("getting-started/installation")? {
//!     Some(page) => println!("{}", page.html),
//!     None => println!("404"),
//! }
//! # Ok(())
//! # }
//! ```

mod docs;
mod error;
mod loader;
mod metadata;
mod navigation;
mod page;
mod routes;
mod weeks;

pub use docs::Docs;
pub use error::DocsError;
pub use loader::{ContentLoader, DOCS_DIR, DOCS_FILE, Slug, WEEK_EXTENSION, WEEKS_DIR};
pub use metadata::{Author, DocFrontmatter, NO_DESCRIPTION, UNTITLED, WeekFrontmatter};
pub use navigation::{
    BreadcrumbItem, ChildPage, ChildScope, DOCS_URL_PREFIX, NavigationResult, breadcrumbs,
    prev_next, resolve_children,
};
pub use page::{DocPage, NOT_FOUND_DESCRIPTION, NOT_FOUND_TITLE, PageMeta};
pub use routes::{PageRoute, RouteError, RouteNode, RouteTable};
pub use weeks::{WeekEntry, Weeks};

// Re-export renderer types that appear in this crate's API
pub use hb_renderer::{CompiledDocument, TocEntry};
