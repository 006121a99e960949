//! Navigation derived from the route table: prev/next, children, breadcrumbs.

use serde::Serialize;

use crate::metadata::DocFrontmatter;
use crate::routes::{PageRoute, RouteNode, RouteTable};

/// URL prefix under which documentation pages are served.
pub const DOCS_URL_PREFIX: &str = "/docs";

/// Neighbours of a page in route order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavigationResult {
    pub prev: Option<PageRoute>,
    pub next: Option<PageRoute>,
}

/// Previous and next page of `slug` in [`RouteTable::page_routes`] order.
///
/// Unknown slugs have neither.
pub fn prev_next(routes: &RouteTable, slug: &str) -> NavigationResult {
    let Some(index) = routes.position(slug) else {
        return NavigationResult::default();
    };
    let pages = routes.page_routes();
    NavigationResult {
        prev: index.checked_sub(1).map(|i| pages[i].clone()),
        next: pages.get(index + 1).cloned(),
    }
}

/// Where a children listing ended up in the route tree.
#[derive(Debug, PartialEq, Eq)]
pub struct ChildScope<'a> {
    /// Accumulated href of the deepest matched node, e.g. `/a/b`.
    pub prefix: String,
    /// Children of that node.
    pub items: &'a [RouteNode],
}

/// Walk the route tree along `path`, one segment at a time.
///
/// Descent stops at the first segment with no matching child; the listing
/// is then that of the last matched node. When not even the first segment
/// matches, the listing is empty.
pub fn resolve_children<'a>(routes: &'a RouteTable, path: &str) -> ChildScope<'a> {
    let mut prefix = String::new();
    let mut items = routes.roots();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let Some(node) = items.iter().find(|n| n.href[1..] == *segment) else {
            break;
        };
        prefix.push_str(&node.href);
        items = &node.items;
    }

    if prefix.is_empty() {
        return ChildScope { prefix, items: &[] };
    }
    ChildScope { prefix, items }
}

/// A child page with its frontmatter, as listed under a parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChildPage {
    #[serde(flatten)]
    pub frontmatter: DocFrontmatter,
    /// Link path, e.g. `/docs/getting-started/installation`.
    pub href: String,
}

/// One breadcrumb entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BreadcrumbItem {
    pub title: String,
    /// Link target; absent for the current page.
    pub href: Option<String>,
}

/// Breadcrumb trail for a documentation slug.
///
/// Starts with a `Docs` item, then one item per segment titled from the
/// route table or, for undeclared paths, from the segment itself.
pub fn breadcrumbs(routes: &RouteTable, slug: &str) -> Vec<BreadcrumbItem> {
    let segments: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
    let mut trail = vec![BreadcrumbItem {
        title: "Docs".to_owned(),
        href: (!segments.is_empty()).then(|| DOCS_URL_PREFIX.to_owned()),
    }];

    let mut path = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(segment);

        let title = routes
            .node(&path)
            .map_or_else(|| title_case_segment(segment), |node| node.title.clone());
        let is_last = i + 1 == segments.len();
        trail.push(BreadcrumbItem {
            title,
            href: (!is_last).then(|| format!("{DOCS_URL_PREFIX}/{path}")),
        });
    }
    trail
}

/// `getting-started` → `Getting Started`.
fn title_case_segment(segment: &str) -> String {
    segment
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
