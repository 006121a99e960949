//! Route table: the static tree of addressable documentation pages.
//!
//! The tree is validated once at construction and never mutated afterwards;
//! services share it behind an `Arc`.

use serde::{Deserialize, Serialize};

/// A node of the route tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    /// Single path segment with a leading slash, e.g. `/installation`.
    pub href: String,
    /// Display title.
    pub title: String,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<RouteNode>,
    /// Grouping node without a page of its own.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_link: bool,
}

impl RouteNode {
    /// Create a leaf node.
    pub fn new(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: title.into(),
            items: Vec::new(),
            no_link: false,
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn with_item(mut self, item: RouteNode) -> Self {
        self.items.push(item);
        self
    }

    /// Mark as a grouping node.
    #[must_use]
    pub fn without_link(mut self) -> Self {
        self.no_link = true;
        self
    }
}

/// An addressable page with its fully-qualified href.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRoute {
    pub title: String,
    /// Concatenated ancestor hrefs, e.g. `/getting-started/installation`.
    pub href: String,
}

impl PageRoute {
    /// Href without the leading slash, usable as a slug.
    pub fn slug(&self) -> &str {
        self.href.trim_start_matches('/')
    }
}

/// Error returned for a malformed route tree.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Href is not a single `/segment`.
    #[error("Invalid route href `{href}`: {reason}")]
    InvalidHref { href: String, reason: &'static str },
    /// Two siblings share an href.
    #[error("Duplicate route href `{href}` under `{parent}`")]
    DuplicateHref { parent: String, href: String },
    /// Title is blank.
    #[error("Route `{href}` has an empty title")]
    EmptyTitle { href: String },
}

/// Validated, immutable route tree.
#[derive(Debug)]
pub struct RouteTable {
    roots: Vec<RouteNode>,
    pages: Vec<PageRoute>,
}

impl RouteTable {
    /// Validate the tree and flatten its page routes.
    pub fn new(roots: Vec<RouteNode>) -> Result<Self, RouteError> {
        validate_level(&roots, "")?;

        let mut pages = Vec::new();
        flatten(&roots, "", &mut pages);

        Ok(Self { roots, pages })
    }

    /// Empty table.
    pub fn empty() -> Self {
        Self {
            roots: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Top-level nodes in declared order.
    pub fn roots(&self) -> &[RouteNode] {
        &self.roots
    }

    /// Every addressable page in pre-order (parents before children).
    pub fn page_routes(&self) -> &[PageRoute] {
        &self.pages
    }

    /// Find a page route by slug (`getting-started/installation`).
    pub fn find(&self, slug: &str) -> Option<&PageRoute> {
        let href = format!("/{}", slug.trim_matches('/'));
        self.pages.iter().find(|p| p.href == href)
    }

    /// Position of a page in [`page_routes`](Self::page_routes).
    pub fn position(&self, slug: &str) -> Option<usize> {
        let href = format!("/{}", slug.trim_matches('/'));
        self.pages.iter().position(|p| p.href == href)
    }

    /// Find any node, grouping nodes included, by its slug path.
    pub fn node(&self, slug: &str) -> Option<&RouteNode> {
        let mut level = self.roots.as_slice();
        let mut found = None;
        for segment in slug.split('/').filter(|s| !s.is_empty()) {
            let node = level.iter().find(|n| n.href[1..] == *segment)?;
            level = &node.items;
            found = Some(node);
        }
        found
    }
}

fn validate_level(nodes: &[RouteNode], parent: &str) -> Result<(), RouteError> {
    let mut seen = std::collections::HashSet::new();
    for node in nodes {
        validate_href(&node.href)?;
        if node.title.trim().is_empty() {
            return Err(RouteError::EmptyTitle {
                href: format!("{parent}{}", node.href),
            });
        }
        if !seen.insert(node.href.as_str()) {
            return Err(RouteError::DuplicateHref {
                parent: if parent.is_empty() { "/".to_owned() } else { parent.to_owned() },
                href: node.href.clone(),
            });
        }
        validate_level(&node.items, &format!("{parent}{}", node.href))?;
    }
    Ok(())
}

fn validate_href(href: &str) -> Result<(), RouteError> {
    let reason = match href.strip_prefix('/') {
        None => Some("must start with `/`"),
        Some("") => Some("segment is empty"),
        Some("." | "..") => Some("segment must not be `.` or `..`"),
        Some(segment) if segment.contains('/') => Some("must be a single path segment"),
        Some(segment) if segment.contains(['\\', '\0']) => Some("contains a forbidden character"),
        Some(_) => None,
    };
    match reason {
        Some(reason) => Err(RouteError::InvalidHref {
            href: href.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

fn flatten(nodes: &[RouteNode], prefix: &str, out: &mut Vec<PageRoute>) {
    for node in nodes {
        let href = format!("{prefix}{}", node.href);
        if !node.no_link {
            out.push(PageRoute {
                title: node.title.clone(),
                href: href.clone(),
            });
        }
        flatten(&node.items, &href, out);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_routes() -> Vec<RouteNode> {
        vec![
            RouteNode::new("/getting-started", "Getting Started")
                .with_item(RouteNode::new("/introduction", "Introduction"))
                .with_item(RouteNode::new("/installation", "Installation")),
            RouteNode::new("/guides", "Guides")
                .without_link()
                .with_item(RouteNode::new("/deploy", "Deploy")),
            RouteNode::new("/faq", "FAQ"),
        ]
    }

    fn hrefs(table: &RouteTable) -> Vec<&str> {
        table.page_routes().iter().map(|p| p.href.as_str()).collect()
    }

    #[test]
    fn test_page_routes_pre_order() {
        let table = RouteTable::new(sample_routes()).unwrap();

        assert_eq!(
            hrefs(&table),
            vec![
                "/getting-started",
                "/getting-started/introduction",
                "/getting-started/installation",
                "/guides/deploy",
                "/faq",
            ]
        );
    }

    #[test]
    fn test_find_and_position() {
        let table = RouteTable::new(sample_routes()).unwrap();

        assert_eq!(
            table.find("getting-started/installation").map(|p| p.title.as_str()),
            Some("Installation")
        );
        assert_eq!(table.position("faq"), Some(4));
        assert!(table.find("guides").is_none());
        assert!(table.find("missing").is_none());
    }

    #[test]
    fn test_node_includes_grouping_nodes() {
        let table = RouteTable::new(sample_routes()).unwrap();

        assert_eq!(table.node("guides").map(|n| n.title.as_str()), Some("Guides"));
        assert_eq!(table.node("guides/deploy").map(|n| n.title.as_str()), Some("Deploy"));
        assert!(table.node("guides/missing").is_none());
        assert!(table.node("").is_none());
    }

    #[test]
    fn test_page_route_slug() {
        let table = RouteTable::new(sample_routes()).unwrap();

        assert_eq!(table.page_routes()[1].slug(), "getting-started/introduction");
    }

    #[test]
    fn test_rejects_invalid_hrefs() {
        for href in ["intro", "/", "/a/b", "/..", "/.", "/a\\b"] {
            let result = RouteTable::new(vec![RouteNode::new(href, "T")]);
            assert!(
                matches!(result, Err(RouteError::InvalidHref { .. })),
                "{href} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_duplicate_siblings() {
        let result = RouteTable::new(vec![
            RouteNode::new("/a", "A")
                .with_item(RouteNode::new("/x", "X"))
                .with_item(RouteNode::new("/x", "X again")),
        ]);

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Duplicate route href `/x` under `/a`");
    }

    #[test]
    fn test_same_href_under_different_parents_is_allowed() {
        let result = RouteTable::new(vec![
            RouteNode::new("/a", "A").with_item(RouteNode::new("/setup", "Setup")),
            RouteNode::new("/b", "B").with_item(RouteNode::new("/setup", "Setup")),
        ]);

        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_empty_title() {
        let result = RouteTable::new(vec![RouteNode::new("/a", "A").with_item(RouteNode::new("/b", " "))]);

        assert!(matches!(result, Err(RouteError::EmptyTitle { href }) if href == "/a/b"));
    }

    #[test]
    fn test_deserialize_nested_routes() {
        let json = r#"[{"href": "/a", "title": "A", "items": [{"href": "/b", "title": "B"}]}]"#;
        let nodes: Vec<RouteNode> = serde_json::from_str(json).unwrap();

        let table = RouteTable::new(nodes).unwrap();

        assert_eq!(hrefs(&table), vec!["/a", "/a/b"]);
    }
}
