//! HTML serialization of the document tree.
//!
//! Registry components and the element overrides (`a`, `img`, `table`,
//! `pre`) are rendered here, after every transform has run. Element `raw`
//! data is never written out; the post-process stage exposes it as an
//! attribute where the output needs it.

use std::fmt::Write;

use crate::components::ComponentKind;
use crate::tree::{Component, Document, Element, Node};
use crate::util::escape_html;

const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "input"];

const YOUTUBE_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";

/// Serialize a document to HTML.
pub fn render_html(doc: &Document) -> String {
    let mut out = String::new();
    write_nodes(&doc.children, &mut out);
    out
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        write_node(node, out);
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Raw(html) => out.push_str(html),
        Node::Element(el) => write_element(el, out),
        Node::Component(component) => write_component(component, out),
    }
}

fn write_element(el: &Element, out: &mut String) {
    match el.tag.as_str() {
        "a" => {
            let external = el.attr("href").is_some_and(is_external);
            let mut extra = Vec::new();
            if external && el.attr("target").is_none() {
                extra.push(("target", "_blank"));
            }
            if external && el.attr("rel").is_none() {
                extra.push(("rel", "noopener noreferrer"));
            }
            write_plain(el, &extra, out);
        }
        "img" if el.attr("loading").is_none() => write_plain(el, &[("loading", "lazy")], out),
        "table" => {
            out.push_str(r#"<div class="table-wrapper">"#);
            write_plain(el, &[], out);
            out.push_str("</div>");
        }
        "pre" => {
            out.push_str(r#"<div class="code-block">"#);
            out.push_str(
                r#"<button type="button" class="copy-button" aria-label="Copy code"></button>"#,
            );
            write_plain(el, &[], out);
            out.push_str("</div>");
        }
        _ => write_plain(el, &[], out),
    }
}

/// Write an element with its own attributes followed by `extra`.
fn write_plain(el: &Element, extra: &[(&str, &str)], out: &mut String) {
    let attrs = el
        .attrs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(extra.iter().copied());
    write_start(&el.tag, attrs, out);
    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }
    write_nodes(&el.children, out);
    write!(out, "</{}>", el.tag).unwrap();
}

fn write_start<'a>(tag: &str, attrs: impl Iterator<Item = (&'a str, &'a str)>, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        write!(out, r#" {name}="{}""#, escape_html(value)).unwrap();
    }
    out.push('>');
}

fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

/// Non-empty prop value.
fn non_empty<'a>(component: &'a Component, name: &str) -> Option<&'a str> {
    component.prop(name).filter(|v| !v.is_empty())
}

fn write_component(component: &Component, out: &mut String) {
    match component.kind {
        ComponentKind::Tabs => {
            let mut attrs = vec![("class", "tabs")];
            if let Some(default) = non_empty(component, "defaultValue") {
                attrs.push(("data-default-value", default));
            }
            wrap("div", attrs, &component.children, out);
        }
        ComponentKind::TabsList => wrap(
            "div",
            vec![("class", "tabs-list"), ("role", "tablist")],
            &component.children,
            out,
        ),
        ComponentKind::TabsTrigger => wrap(
            "button",
            vec![
                ("type", "button"),
                ("class", "tabs-trigger"),
                ("role", "tab"),
                ("data-value", non_empty(component, "value").unwrap_or_default()),
            ],
            &component.children,
            out,
        ),
        ComponentKind::TabsContent => wrap(
            "div",
            vec![
                ("class", "tabs-content"),
                ("role", "tabpanel"),
                ("data-value", non_empty(component, "value").unwrap_or_default()),
            ],
            &component.children,
            out,
        ),
        ComponentKind::Note => write_note(component, out),
        ComponentKind::Stepper => {
            wrap("div", vec![("class", "stepper")], &component.children, out);
        }
        ComponentKind::StepperItem => {
            out.push_str(r#"<div class="stepper-item">"#);
            if let Some(title) = non_empty(component, "title") {
                write!(out, r#"<p class="stepper-title">{}</p>"#, escape_html(title)).unwrap();
            }
            wrap("div", vec![("class", "stepper-content")], &component.children, out);
            out.push_str("</div>");
        }
        ComponentKind::Files => wrap("div", vec![("class", "files")], &component.children, out),
        ComponentKind::Outlet => wrap(
            "div",
            vec![
                ("class", "outlet"),
                ("data-path", non_empty(component, "path").unwrap_or_default()),
            ],
            &component.children,
            out,
        ),
        ComponentKind::YouTube => write_youtube(component, out),
    }
}

fn write_note(component: &Component, out: &mut String) {
    let kind = non_empty(component, "type").unwrap_or("note");
    let title = non_empty(component, "title").map_or_else(|| title_case(kind), str::to_owned);

    write!(
        out,
        r#"<div class="note note-{}"><p class="note-title">{}</p>"#,
        escape_html(kind),
        escape_html(&title)
    )
    .unwrap();
    wrap("div", vec![("class", "note-content")], &component.children, out);
    out.push_str("</div>");
}

fn write_youtube(component: &Component, out: &mut String) {
    let video_id = non_empty(component, "videoId").unwrap_or_default();
    let title = non_empty(component, "title").unwrap_or("YouTube Video");
    let description = non_empty(component, "description");

    out.push_str(r#"<div class="youtube">"#);
    write_start(
        "iframe",
        [
            ("class", "youtube-frame"),
            ("src", format!("https://www.youtube.com/embed/{video_id}").as_str()),
            ("title", title),
            ("allow", YOUTUBE_ALLOW),
            ("allowfullscreen", ""),
        ]
        .into_iter(),
        out,
    );
    out.push_str("</iframe>");
    out.push_str(r#"<div class="youtube-caption">"#);
    write!(out, r#"<p class="youtube-title">{}</p>"#, escape_html(title)).unwrap();
    if let Some(description) = description {
        write!(
            out,
            r#"<p class="youtube-description">{}</p>"#,
            escape_html(description)
        )
        .unwrap();
    }
    out.push_str("</div></div>");
}

fn wrap(tag: &str, attrs: Vec<(&str, &str)>, children: &[Node], out: &mut String) {
    write_start(tag, attrs.into_iter(), out);
    write_nodes(children, out);
    write!(out, "</{tag}>").unwrap();
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
