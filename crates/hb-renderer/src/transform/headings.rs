//! Heading ids and self-link anchors.

use super::{Transform, TransformContext};
use crate::error::CompileError;
use crate::toc::slugify;
use crate::tree::{Document, Element, Node};
use crate::util::is_heading_tag;

/// Give every heading an `id` derived from its text.
///
/// Uses the same [`slugify`] as the TOC so anchors always resolve. Existing
/// ids are kept.
pub struct HeadingSlugs;

impl Transform for HeadingSlugs {
    fn name(&self) -> &'static str {
        "heading-slugs"
    }

    fn apply(&self, doc: &mut Document, _: &mut TransformContext) -> Result<(), CompileError> {
        doc.for_each_element_mut(|el| {
            if is_heading_tag(&el.tag) && el.attr("id").is_none() {
                let id = slugify(&heading_text(el));
                el.set_attr("id", id);
            }
        });
        Ok(())
    }
}

/// Text of a heading without its footnote reference markers.
fn heading_text(el: &Element) -> String {
    let mut out = String::new();
    collect_heading_text(&el.children, &mut out);
    out
}

fn collect_heading_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) if child.has_class("footnote-reference") => {}
            Node::Element(_) | Node::Component(_) => collect_heading_text(node.children(), out),
            Node::Raw(_) => {}
        }
    }
}

/// Prepend a self-link anchor to every heading that has an id.
pub struct AutolinkHeadings;

impl Transform for AutolinkHeadings {
    fn name(&self) -> &'static str {
        "autolink-headings"
    }

    fn apply(&self, doc: &mut Document, _: &mut TransformContext) -> Result<(), CompileError> {
        doc.for_each_element_mut(|el| {
            if !is_heading_tag(&el.tag) {
                return;
            }
            let Some(id) = el.attr("id").map(str::to_owned) else {
                return;
            };
            let anchor = Element::new("a")
                .with_attr("aria-hidden", "true")
                .with_attr("tabindex", "-1")
                .with_attr("href", format!("#{id}"))
                .with_child(Element::new("span").with_attr("class", "icon icon-link"));
            el.children.insert(0, anchor.into());
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn heading(tag: &str, text: &str) -> Node {
        Element::new(tag).with_child(Node::text(text)).into()
    }

    #[test]
    fn test_heading_slugs() {
        let mut doc = Document {
            children: vec![
                heading("h2", "Getting Started"),
                heading("h3", "Step 1: Install"),
                heading("p", "Not a heading"),
            ],
        };

        HeadingSlugs
            .apply(&mut doc, &mut TransformContext::default())
            .unwrap();

        assert_eq!(doc.find_all("h2")[0].attr("id"), Some("getting-started"));
        assert_eq!(doc.find_all("h3")[0].attr("id"), Some("step-1-install"));
        assert_eq!(doc.find_all("p")[0].attr("id"), None);
    }

    #[test]
    fn test_heading_slugs_skip_footnote_markers() {
        let footnote = Element::new("sup")
            .with_attr("class", "footnote-reference")
            .with_child(Element::new("a").with_child(Node::text("1")));
        let mut doc = Document {
            children: vec![
                Element::new("h2")
                    .with_child(Node::text("Caveats"))
                    .with_child(footnote)
                    .into(),
            ],
        };

        HeadingSlugs
            .apply(&mut doc, &mut TransformContext::default())
            .unwrap();

        assert_eq!(doc.find_all("h2")[0].attr("id"), Some("caveats"));
    }

    #[test]
    fn test_heading_slugs_keep_existing_id() {
        let mut doc = Document {
            children: vec![Element::new("h2").with_attr("id", "custom").into()],
        };

        HeadingSlugs
            .apply(&mut doc, &mut TransformContext::default())
            .unwrap();

        assert_eq!(doc.find_all("h2")[0].attr("id"), Some("custom"));
    }

    #[test]
    fn test_autolink_headings() {
        let mut doc = Document {
            children: vec![heading("h2", "Intro")],
        };
        let mut ctx = TransformContext::default();

        HeadingSlugs.apply(&mut doc, &mut ctx).unwrap();
        AutolinkHeadings.apply(&mut doc, &mut ctx).unwrap();

        let h2 = doc.find_all("h2")[0];
        let anchor = h2.first_element_child().unwrap();
        assert_eq!(anchor.tag, "a");
        assert_eq!(anchor.attr("href"), Some("#intro"));
        assert_eq!(anchor.attr("aria-hidden"), Some("true"));
        assert_eq!(anchor.attr("tabindex"), Some("-1"));
        assert!(anchor.first_element_child().unwrap().has_class("icon-link"));
        assert_eq!(h2.text_content(), "Intro");
    }

    #[test]
    fn test_autolink_skips_headings_without_id() {
        let mut doc = Document {
            children: vec![heading("h2", "Intro")],
        };

        AutolinkHeadings
            .apply(&mut doc, &mut TransformContext::default())
            .unwrap();

        assert!(doc.find_all("a").is_empty());
    }
}
