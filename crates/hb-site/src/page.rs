//! Page assembly at the rendering boundary.

use std::collections::HashMap;

use hb_renderer::{ComponentKind, Document, Element, Node, TocEntry};
use serde::Serialize;

use crate::navigation::{BreadcrumbItem, ChildPage, NavigationResult};

/// Title used for missing pages.
pub const NOT_FOUND_TITLE: &str = "Not Found";
/// Description used for missing pages.
pub const NOT_FOUND_DESCRIPTION: &str = "Page not found";

/// Everything the presentation layer needs to show a documentation page.
#[derive(Clone, Debug, Serialize)]
pub struct DocPage {
    pub slug: String,
    /// Title with the `Untitled Page` fallback applied.
    pub title: String,
    /// Description with the `No description available` fallback applied.
    pub description: String,
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub breadcrumbs: Vec<BreadcrumbItem>,
    pub navigation: NavigationResult,
    /// Non-fatal compile warnings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// `<title>` and meta description of a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
}

impl PageMeta {
    pub fn not_found() -> Self {
        Self {
            title: NOT_FOUND_TITLE.to_owned(),
            description: NOT_FOUND_DESCRIPTION.to_owned(),
        }
    }
}

/// `path` props of every `<Outlet>` in the tree, in document order.
pub(crate) fn outlet_paths(tree: &Document) -> Vec<String> {
    tree.components()
        .into_iter()
        .filter(|c| c.kind == ComponentKind::Outlet)
        .filter_map(|c| c.prop("path").map(str::to_owned))
        .collect()
}

/// Fill each `<Outlet>` with a card per child page.
pub(crate) fn expand_outlets(tree: &mut Document, listings: &HashMap<String, Vec<ChildPage>>) {
    tree.for_each_component_mut(|component| {
        if component.kind != ComponentKind::Outlet {
            return;
        }
        let Some(children) = component.prop("path").and_then(|path| listings.get(path)) else {
            return;
        };
        component.children = children.iter().map(child_card).collect();
    });
}

fn child_card(child: &ChildPage) -> Node {
    Element::new("a")
        .with_attr("class", "outlet-card")
        .with_attr("href", child.href.clone())
        .with_child(
            Element::new("h4")
                .with_attr("class", "outlet-title")
                .with_child(Node::text(child.frontmatter.display_title())),
        )
        .with_child(
            Element::new("p")
                .with_attr("class", "outlet-description")
                .with_child(Node::text(child.frontmatter.display_description())),
        )
        .into()
}
