//! Document tree.
//!
//! The builder turns markdown events into this tree; every transform stage
//! then rewrites it in place; [`crate::html`] serializes it last.
//! Unlike rendered HTML, the tree keeps per-node data that is never written
//! out ([`Element::raw`]), which is how raw code survives highlighting.

use std::collections::BTreeMap;

use crate::components::ComponentKind;

/// A node in the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Regular HTML element.
    Element(Element),
    /// Text, escaped on output.
    Text(String),
    /// Pre-rendered HTML, written verbatim (highlighted code, inline HTML).
    Raw(String),
    /// Registry component with its props.
    Component(Component),
}

impl Node {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Borrow as element.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Borrow as mutable element.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Child nodes (empty for text and raw nodes).
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(el) => &el.children,
            Self::Component(c) => &c.children,
            Self::Text(_) | Self::Raw(_) => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Element(el) => Some(&mut el.children),
            Self::Component(c) => Some(&mut c.children),
            Self::Text(_) | Self::Raw(_) => None,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Raw(_) => {}
            Self::Element(_) | Self::Component(_) => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<Component> for Node {
    fn from(c: Component) -> Self {
        Self::Component(c)
    }
}

/// HTML element with ordered attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name (`p`, `pre`, `h2`, ...).
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
    /// Stage-to-stage data; never serialized.
    pub raw: Option<String>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Whether the `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// First child that is an element.
    pub fn first_element_child(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }

    /// Mutable first child element.
    pub fn first_element_child_mut(&mut self) -> Option<&mut Element> {
        self.children.iter_mut().find_map(Node::as_element_mut)
    }
}

/// An instance of a registry component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    /// Which component.
    pub kind: ComponentKind,
    /// Props as written in the source.
    pub props: BTreeMap<String, String>,
    /// Nested content.
    pub children: Vec<Node>,
}

impl Component {
    /// Create a component with no props.
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            props: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Prop value by name.
    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }
}

/// Root of a compiled document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Document {
    /// Visit every element in document order.
    pub fn for_each_element_mut<F: FnMut(&mut Element)>(&mut self, mut f: F) {
        walk_elements(&mut self.children, &mut f);
    }

    /// Visit every child list (the root list included), parents first.
    ///
    /// Lets a stage insert or replace siblings, which an element visitor
    /// cannot do.
    pub fn for_each_child_list_mut<F: FnMut(&mut Vec<Node>)>(&mut self, mut f: F) {
        walk_lists(&mut self.children, &mut f);
    }

    /// Visit every component in document order.
    pub fn for_each_component_mut<F: FnMut(&mut Component)>(&mut self, mut f: F) {
        walk_components(&mut self.children, &mut f);
    }

    /// All elements with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_elements(&self.children, tag, &mut found);
        found
    }

    /// All components in document order.
    pub fn components(&self) -> Vec<&Component> {
        let mut found = Vec::new();
        collect_components(&self.children, &mut found);
        found
    }

    /// Concatenated text of the whole document.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.collect_text(&mut out);
        }
        out
    }
}

fn walk_elements<F: FnMut(&mut Element)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
        }
        if let Some(children) = node.children_mut() {
            walk_elements(children, f);
        }
    }
}

fn walk_lists<F: FnMut(&mut Vec<Node>)>(nodes: &mut Vec<Node>, f: &mut F) {
    f(nodes);
    for node in nodes.iter_mut() {
        if let Some(children) = node.children_mut() {
            walk_lists(children, f);
        }
    }
}

fn walk_components<F: FnMut(&mut Component)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        if let Node::Component(c) = node {
            f(c);
        }
        if let Some(children) = node.children_mut() {
            walk_components(children, f);
        }
    }
}

fn collect_elements<'a>(nodes: &'a [Node], tag: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node
            && el.tag == tag
        {
            found.push(el);
        }
        collect_elements(node.children(), tag, found);
    }
}

fn collect_components<'a>(nodes: &'a [Node], found: &mut Vec<&'a Component>) {
    for node in nodes {
        if let Node::Component(c) = node {
            found.push(c);
        }
        collect_components(node.children(), found);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Document {
        Document {
            children: vec![
                Element::new("h2")
                    .with_child(Node::text("Hello "))
                    .with_child(Element::new("code").with_child(Node::text("world")))
                    .into(),
                Component::new(ComponentKind::Note).into(),
                Element::new("p")
                    .with_child(Node::Raw("<br>".to_owned()))
                    .with_child(Node::text("tail"))
                    .into(),
            ],
        }
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut el = Element::new("a")
            .with_attr("href", "/x")
            .with_attr("class", "link");
        el.set_attr("href", "/y");

        assert_eq!(
            el.attrs,
            vec![
                ("href".to_owned(), "/y".to_owned()),
                ("class".to_owned(), "link".to_owned()),
            ]
        );
    }

    #[test]
    fn test_has_class() {
        let el = Element::new("div").with_attr("class", "code-title  highlighted");

        assert!(el.has_class("code-title"));
        assert!(el.has_class("highlighted"));
        assert!(!el.has_class("code"));
    }

    #[test]
    fn test_text_content_skips_raw() {
        let doc = sample();

        assert_eq!(doc.text_content(), "Hello worldtail");
        assert_eq!(doc.find_all("h2")[0].text_content(), "Hello world");
    }

    #[test]
    fn test_for_each_element_mut_visits_nested() {
        let mut doc = sample();
        let mut tags = Vec::new();
        doc.for_each_element_mut(|el| tags.push(el.tag.clone()));

        assert_eq!(tags, vec!["h2", "code", "p"]);
    }

    #[test]
    fn test_for_each_child_list_mut_allows_insertion() {
        let mut doc = sample();
        doc.for_each_child_list_mut(|list| {
            if list.iter().any(|n| n.as_element().is_some_and(|e| e.tag == "p")) {
                list.insert(0, Element::new("hr").into());
            }
        });

        assert_eq!(doc.children.len(), 4);
        assert_eq!(doc.children[0].as_element().map(|e| e.tag.as_str()), Some("hr"));
    }

    #[test]
    fn test_components() {
        let doc = sample();

        assert_eq!(doc.components().len(), 1);
        assert_eq!(doc.components()[0].kind, ComponentKind::Note);
    }
}
