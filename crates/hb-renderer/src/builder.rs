//! Markdown events to document tree.
//!
//! This is the first pipeline stage: GFM parsing (tables, strikethrough, task
//! lists, footnotes, alerts, literal autolinks) plus component binding. Component
//! tags arrive from pulldown-cmark as HTML and are resolved against the
//! closed registry here, so an unknown component fails before any transform
//! runs.

use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{
    BlockQuoteKind, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd,
};
use regex::Regex;

use crate::components::{ComponentKind, ComponentTag, Fragment, isolate_component_lines, tokenize};
use crate::error::CompileError;
use crate::state::{CodeBlockState, ImageState, TableState};
use crate::tree::{Component, Document, Element, Node};
use crate::util::heading_level_to_num;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)[^\s<>]+").expect("valid url regex"));

/// Parser options for GitHub Flavored Markdown.
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
}

/// An element or component whose closing event has not arrived yet.
enum Frame {
    Element(Element),
    Component(Component),
}

/// Builds a [`Document`] from markdown text.
pub(crate) struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Frame>,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    /// Buffered HTML block lines.
    html_block: Option<String>,
    /// Adjacent text events, merged so literal URLs are seen whole.
    pending_text: String,
    link_depth: usize,
    footnotes: HashMap<String, usize>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            html_block: None,
            pending_text: String::new(),
            link_depth: 0,
            footnotes: HashMap::new(),
        }
    }

    /// Parse a markdown body (frontmatter already removed).
    pub(crate) fn build(mut self, markdown: &str) -> Result<Document, CompileError> {
        let source = isolate_component_lines(markdown);
        for event in Parser::new_ext(&source, parser_options()) {
            self.process_event(event)?;
        }
        self.finish()
    }

    fn process_event(&mut self, event: Event<'_>) -> Result<(), CompileError> {
        if !matches!(event, Event::Text(_) | Event::SoftBreak) {
            self.flush_text();
        }

        match event {
            Event::Start(tag) => self.start_tag(tag)?,
            Event::End(tag) => self.end_tag(tag)?,
            Event::Text(text) => self.text(&text),
            Event::SoftBreak => self.text("\n"),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => match self.html_block.as_mut() {
                Some(block) => block.push_str(&html),
                None => self.apply_html(&html, false)?,
            },
            Event::InlineHtml(html) => self.apply_html(&html, false)?,
            Event::HardBreak => self.push(Element::new("br").into()),
            Event::Rule => self.push(Element::new("hr").into()),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input.set_attr("checked", "");
                }
                self.push(input.into());
            }
            Event::FootnoteReference(label) => {
                let number = self.footnote_number(&label);
                let link = Element::new("a")
                    .with_attr("href", format!("#fn-{label}"))
                    .with_attr("id", format!("fnref-{label}"))
                    .with_child(Node::text(number.to_string()));
                self.push(
                    Element::new("sup")
                        .with_attr("class", "footnote-reference")
                        .with_child(link)
                        .into(),
                );
            }
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Math is not enabled
            }
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: Tag<'_>) -> Result<(), CompileError> {
        if self.image.is_active() {
            // Only text contributes to alt text
            return Ok(());
        }

        match tag {
            Tag::Paragraph => self.open(Element::new("p")),
            Tag::Heading { level, .. } => {
                self.open(Element::new(format!("h{}", heading_level_to_num(level))));
            }
            Tag::BlockQuote(None) => self.open(Element::new("blockquote")),
            Tag::BlockQuote(Some(kind)) => {
                let class = match kind {
                    BlockQuoteKind::Note => "alert alert-note",
                    BlockQuoteKind::Tip => "alert alert-tip",
                    BlockQuoteKind::Important => "alert alert-important",
                    BlockQuoteKind::Warning => "alert alert-warning",
                    BlockQuoteKind::Caution => "alert alert-caution",
                };
                self.open(Element::new("blockquote").with_attr("class", class));
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(language);
            }
            Tag::HtmlBlock => self.html_block = Some(String::new()),
            Tag::List(Some(1)) => self.open(Element::new("ol")),
            Tag::List(Some(start)) => {
                self.open(Element::new("ol").with_attr("start", start.to_string()));
            }
            Tag::List(None) => self.open(Element::new("ul")),
            Tag::Item => self.open(Element::new("li")),
            Tag::FootnoteDefinition(label) => {
                let number = self.footnote_number(&label);
                self.open(
                    Element::new("div")
                        .with_attr("class", "footnote-definition")
                        .with_attr("id", format!("fn-{label}"))
                        .with_child(
                            Element::new("sup")
                                .with_attr("class", "footnote-definition-label")
                                .with_child(Node::text(number.to_string())),
                        ),
                );
            }
            Tag::DefinitionList => self.open(Element::new("dl")),
            Tag::DefinitionListTitle => self.open(Element::new("dt")),
            Tag::DefinitionListDefinition => self.open(Element::new("dd")),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.open(Element::new("table"));
            }
            Tag::TableHead => {
                self.table.start_head();
                self.open(Element::new("thead"));
                self.open(Element::new("tr"));
            }
            Tag::TableRow => {
                self.table.start_row();
                self.open(Element::new("tr"));
            }
            Tag::TableCell => {
                let mut cell = Element::new(self.table.cell_tag());
                if let Some(style) = self.table.current_alignment_style() {
                    cell.set_attr("style", style);
                }
                self.open(cell);
            }
            Tag::Emphasis => self.open(Element::new("em")),
            Tag::Strong => self.open(Element::new("strong")),
            Tag::Strikethrough => self.open(Element::new("del")),
            Tag::Superscript => self.open(Element::new("sup")),
            Tag::Subscript => self.open(Element::new("sub")),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = if link_type == LinkType::Email && !dest_url.starts_with("mailto:") {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.into_string()
                };
                let mut link = Element::new("a").with_attr("href", href);
                if !title.is_empty() {
                    link.set_attr("title", title.into_string());
                }
                self.link_depth += 1;
                self.open(link);
            }
            Tag::Image {
                dest_url, title, ..
            } => self.image.start(dest_url.into_string(), title.into_string()),
            Tag::MetadataBlock(_) => {}
        }
        Ok(())
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), CompileError> {
        if self.image.is_active() && !matches!(tag, TagEnd::Image) {
            return Ok(());
        }

        match tag {
            TagEnd::CodeBlock => {
                let (language, source) = self.code.end();
                let mut code = Element::new("code");
                if let Some(language) = language {
                    code.set_attr("class", format!("language-{language}"));
                }
                code.children.push(Node::Text(source));
                self.push(Element::new("pre").with_child(code).into());
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html_block.take() {
                    self.apply_html(&html, true)?;
                }
            }
            TagEnd::Image => {
                if let Some((src, title, alt)) = self.image.end() {
                    let mut img = Element::new("img")
                        .with_attr("src", src)
                        .with_attr("alt", alt);
                    if !title.is_empty() {
                        img.set_attr("title", title);
                    }
                    self.push(img.into());
                }
            }
            TagEnd::TableHead => {
                self.close()?; // tr
                self.close()?; // thead
                self.table.end_head();
                self.open(Element::new("tbody"));
            }
            TagEnd::Table => {
                self.close()?; // tbody
                self.close()?;
            }
            TagEnd::TableCell => {
                self.close()?;
                self.table.next_cell();
            }
            TagEnd::Link => {
                self.link_depth = self.link_depth.saturating_sub(1);
                self.close()?;
            }
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::TableRow
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript => self.close()?,
            TagEnd::MetadataBlock(_) => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            self.pending_text.push_str(text);
        }
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        if self.link_depth > 0 {
            self.push(Node::Text(text));
        } else {
            for node in link_literals(&text) {
                self.push(node);
            }
        }
    }

    fn inline_code(&mut self, code: &CowStr<'_>) {
        if self.image.is_active() {
            self.image.push_str(code);
        } else {
            self.push(Element::new("code").with_child(Node::text(code.as_ref())).into());
        }
    }

    /// Resolve component tags in an HTML fragment; other HTML stays raw.
    fn apply_html(&mut self, html: &str, block: bool) -> Result<(), CompileError> {
        for fragment in tokenize(html) {
            match fragment {
                Fragment::Html(raw) if block && raw.trim().is_empty() => {}
                Fragment::Html(raw) => self.push(Node::Raw(raw.to_owned())),
                Fragment::Tag(ComponentTag::Open {
                    name,
                    props,
                    self_closing,
                }) => {
                    let kind = ComponentKind::from_name(&name)
                        .ok_or(CompileError::UnknownComponent { name })?;
                    kind.validate(&props)?;
                    let component = Component {
                        kind,
                        props,
                        children: Vec::new(),
                    };
                    if self_closing {
                        self.push(component.into());
                    } else {
                        self.stack.push(Frame::Component(component));
                    }
                }
                Fragment::Tag(ComponentTag::Close { name }) => self.close_component(name)?,
            }
        }
        Ok(())
    }

    fn close_component(&mut self, name: String) -> Result<(), CompileError> {
        let matches_top =
            matches!(self.stack.last(), Some(Frame::Component(c)) if c.kind.name() == name);
        if !matches_top {
            if ComponentKind::from_name(&name).is_none() {
                return Err(CompileError::UnknownComponent { name });
            }
            return Err(CompileError::UnbalancedComponent {
                name,
                reason: "closing tag without a matching opening tag",
            });
        }
        if let Some(Frame::Component(component)) = self.stack.pop() {
            self.push(component.into());
        }
        Ok(())
    }

    fn open(&mut self, element: Element) {
        self.stack.push(Frame::Element(element));
    }

    /// Close the innermost markdown element.
    fn close(&mut self) -> Result<(), CompileError> {
        match self.stack.pop() {
            Some(Frame::Element(element)) => {
                self.push(element.into());
                Ok(())
            }
            Some(Frame::Component(component)) => Err(CompileError::UnbalancedComponent {
                name: component.kind.name().to_owned(),
                reason: "not closed before the end of its enclosing block",
            }),
            None => Ok(()),
        }
    }

    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(Frame::Element(el)) => el.children.push(node),
            Some(Frame::Component(c)) => c.children.push(node),
            None => self.root.push(node),
        }
    }

    fn footnote_number(&mut self, label: &str) -> usize {
        let next = self.footnotes.len() + 1;
        *self.footnotes.entry(label.to_owned()).or_insert(next)
    }

    fn finish(mut self) -> Result<Document, CompileError> {
        self.flush_text();
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Component(component) => {
                    return Err(CompileError::UnbalancedComponent {
                        name: component.kind.name().to_owned(),
                        reason: "never closed",
                    });
                }
                Frame::Element(element) => self.push(element.into()),
            }
        }

        let mut document = Document {
            children: self.root,
        };
        document.for_each_child_list_mut(|list| list.iter_mut().for_each(unwrap_sole_component));
        Ok(document)
    }
}

/// Replace a paragraph holding nothing but one component by the component.
///
/// `<Note>Short</Note>` on a single line parses as a paragraph of inline
/// HTML; the component should stand at block level instead.
fn unwrap_sole_component(node: &mut Node) {
    let Node::Element(paragraph) = node else {
        return;
    };
    if paragraph.tag != "p" {
        return;
    }

    let mut meaningful = paragraph.children.iter().filter(|n| !is_blank_text(n));
    let (Some(Node::Component(_)), None) = (meaningful.next(), meaningful.next()) else {
        return;
    };

    let children = std::mem::take(&mut paragraph.children);
    if let Some(component) = children
        .into_iter()
        .find(|n| matches!(n, Node::Component(_)))
    {
        *node = component;
    }
}

fn is_blank_text(node: &Node) -> bool {
    matches!(node, Node::Text(text) if text.trim().is_empty())
}

/// Split text into text nodes and links for bare URLs (`https://…`, `www.…`).
fn link_literals(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut last = 0;

    for m in URL_RE.find_iter(text) {
        let at_boundary = text[..m.start()]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace() || matches!(c, '*' | '_' | '~' | '('));
        let url = trim_url(m.as_str());
        let rest = url
            .split_once("://")
            .map_or_else(|| url.strip_prefix("www.").unwrap_or(""), |(_, r)| r);
        if !at_boundary || rest.is_empty() {
            continue;
        }

        if m.start() > last {
            nodes.push(Node::text(&text[last..m.start()]));
        }
        let href = if url.starts_with("www.") {
            format!("http://{url}")
        } else {
            url.to_owned()
        };
        nodes.push(
            Element::new("a")
                .with_attr("href", href)
                .with_child(Node::text(url))
                .into(),
        );
        last = m.start() + url.len();
    }

    if last < text.len() {
        nodes.push(Node::text(&text[last..]));
    }
    nodes
}

/// Drop trailing punctuation and unbalanced closing parentheses.
fn trim_url(url: &str) -> &str {
    let mut end = url.len();
    while let Some(c) = url[..end].chars().next_back() {
        let s = &url[..end];
        let unbalanced_paren = c == ')' && s.matches(')').count() > s.matches('(').count();
        if matches!(c, '?' | '!' | '.' | ',' | ':' | ';' | '*' | '_' | '~' | '\'' | '"')
            || unbalanced_paren
        {
            end -= c.len_utf8();
        } else {
            break;
        }
    }
    &url[..end]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn build(markdown: &str) -> Document {
        TreeBuilder::new().build(markdown).unwrap()
    }

    fn tags(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| match n {
                Node::Element(el) => el.tag.clone(),
                Node::Component(c) => c.kind.name().to_owned(),
                Node::Text(_) => "#text".to_owned(),
                Node::Raw(_) => "#raw".to_owned(),
            })
            .collect()
    }

    #[test]
    fn test_paragraph_and_heading() {
        let doc = build("## Hello *world*\n\nBody text.");

        assert_eq!(tags(&doc.children), vec!["h2", "p"]);
        assert_eq!(doc.find_all("h2")[0].text_content(), "Hello world");
        assert!(doc.find_all("h2")[0].attr("id").is_none());
    }

    #[test]
    fn test_code_block_keeps_exact_source() {
        let doc = build("```rust:src/main.rs\nfn main() {\n    println!(\"<hi>\");\n}\n```\n");

        let pre = doc.find_all("pre")[0];
        let code = pre.first_element_child().unwrap();
        assert_eq!(code.attr("class"), Some("language-rust:src/main.rs"));
        assert_eq!(code.text_content(), "fn main() {\n    println!(\"<hi>\");\n}\n");
    }

    #[test]
    fn test_indented_code_block_has_no_language() {
        let doc = build("Para\n\n    indented\n");

        let code = doc.find_all("code")[0];
        assert!(code.attr("class").is_none());
        assert_eq!(code.text_content(), "indented\n");
    }

    #[test]
    fn test_gfm_table() {
        let doc = build("| A | B |\n|:--|--:|\n| 1 | 2 |\n");

        let table = doc.find_all("table")[0];
        assert_eq!(tags(&table.children), vec!["thead", "tbody"]);
        let th = doc.find_all("th");
        assert_eq!(th[0].attr("style"), Some("text-align:left"));
        assert_eq!(th[1].attr("style"), Some("text-align:right"));
        assert_eq!(doc.find_all("td")[1].text_content(), "2");
    }

    #[test]
    fn test_strikethrough_and_task_list() {
        let doc = build("- [x] ~~done~~\n- [ ] todo\n");

        assert_eq!(doc.find_all("del")[0].text_content(), "done");
        let inputs = doc.find_all("input");
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].attr("checked"), Some(""));
        assert_eq!(inputs[1].attr("checked"), None);
    }

    #[test]
    fn test_literal_autolinks() {
        let doc = build("See https://example.com/docs. Or www.rust-lang.org!");

        let links = doc.find_all("a");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].attr("href"), Some("https://example.com/docs"));
        assert_eq!(links[1].attr("href"), Some("http://www.rust-lang.org"));
        assert_eq!(links[1].text_content(), "www.rust-lang.org");
        assert_eq!(
            doc.text_content(),
            "See https://example.com/docs. Or www.rust-lang.org!"
        );
    }

    #[test]
    fn test_no_autolink_inside_existing_link() {
        let doc = build("[https://a.example](https://b.example)");

        let links = doc.find_all("a");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].attr("href"), Some("https://b.example"));
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("https://x.org/a_(b))."), "https://x.org/a_(b)");
        assert_eq!(trim_url("https://x.org?"), "https://x.org");
    }

    #[test]
    fn test_image_alt_text() {
        let doc = build("![An *owl*](/owl.png \"Owl\")");

        let img = doc.find_all("img")[0];
        assert_eq!(img.attr("src"), Some("/owl.png"));
        assert_eq!(img.attr("alt"), Some("An owl"));
        assert_eq!(img.attr("title"), Some("Owl"));
    }

    #[test]
    fn test_alert_blockquote() {
        let doc = build("> [!WARNING]\n> Mind the gap.\n");

        let quote = doc.find_all("blockquote")[0];
        assert!(quote.has_class("alert-warning"));
        assert_eq!(quote.text_content().trim(), "Mind the gap.");
    }

    #[test]
    fn test_footnotes() {
        let doc = build("Claim[^src].\n\n[^src]: Source text.\n");

        let reference = doc.find_all("sup")[0];
        assert!(reference.has_class("footnote-reference"));
        let definition = doc
            .find_all("div")
            .into_iter()
            .find(|d| d.has_class("footnote-definition"))
            .unwrap();
        assert_eq!(definition.attr("id"), Some("fn-src"));
    }

    #[test]
    fn test_block_component_with_markdown_body() {
        let doc = build("<Note type=\"warning\">\n**Careful** here.\n</Note>\n");

        assert_eq!(tags(&doc.children), vec!["Note"]);
        let Node::Component(note) = &doc.children[0] else {
            panic!("expected component");
        };
        assert_eq!(note.prop("type"), Some("warning"));
        assert_eq!(tags(&note.children), vec!["p"]);
    }

    #[test]
    fn test_nested_components() {
        let doc = build(
            "<Tabs defaultValue=\"npm\">\n  <TabsList>\n    <TabsTrigger value=\"npm\">npm</TabsTrigger>\n  </TabsList>\n  <TabsContent value=\"npm\">\n    ```bash\n    npm i\n    ```\n  </TabsContent>\n</Tabs>\n",
        );

        let components = doc.components();
        let names: Vec<&str> = components.iter().map(|c| c.kind.name()).collect();
        assert_eq!(names, vec!["Tabs", "TabsList", "TabsTrigger", "TabsContent"]);
        assert_eq!(tags(&components[2].children), vec!["#text"]);
        assert_eq!(doc.find_all("code")[0].text_content(), "npm i\n");
    }

    #[test]
    fn test_self_closing_component() {
        let doc = build("<YouTube videoId=\"abc123\" title=\"Demo\" />\n");

        let components = doc.components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].prop("videoId"), Some("abc123"));
    }

    #[test]
    fn test_inline_component_in_sentence_stays_in_paragraph() {
        let doc = build("Watch <YouTube videoId=\"abc\" /> now.");

        assert_eq!(tags(&doc.children), vec!["p"]);
        assert_eq!(doc.components().len(), 1);
    }

    #[test]
    fn test_lowercase_html_passes_through() {
        let doc = build("<div align=\"center\">\n\nHi\n\n</div>\n\nText <kbd>K</kbd>");

        assert_eq!(tags(&doc.children), vec!["#raw", "p", "#raw", "p"]);
    }

    #[test]
    fn test_unknown_component_is_error() {
        let err = TreeBuilder::new().build("<Accordion>\nx\n</Accordion>\n").unwrap_err();

        assert!(matches!(err, CompileError::UnknownComponent { name } if name == "Accordion"));
    }

    #[test]
    fn test_missing_required_prop_is_error() {
        let err = TreeBuilder::new().build("<YouTube title=\"x\" />\n").unwrap_err();

        assert!(matches!(err, CompileError::MissingProp { prop: "videoId", .. }));
    }

    #[test]
    fn test_unclosed_component_is_error() {
        let err = TreeBuilder::new().build("<Note>\nbody\n").unwrap_err();

        assert!(matches!(err, CompileError::UnbalancedComponent { reason: "never closed", .. }));
    }

    #[test]
    fn test_stray_closing_tag_is_error() {
        let err = TreeBuilder::new().build("text\n\n</Stepper>\n").unwrap_err();

        assert!(matches!(err, CompileError::UnbalancedComponent { .. }));
    }

    #[test]
    fn test_component_tags_in_indented_code_are_literal() {
        let doc = build("Example:\n\n    <Note>\n    Body\n    </Note>\n");

        assert!(doc.components().is_empty());
        assert_eq!(
            doc.find_all("code")[0].text_content(),
            "<Note>\nBody\n</Note>\n"
        );
    }

    #[test]
    fn test_component_tags_in_code_are_literal() {
        let doc = build("```mdx\n<Accordion />\n```\n\nUse `<Accordion />` inline.");

        assert!(doc.components().is_empty());
        assert_eq!(doc.find_all("code")[0].text_content(), "<Accordion />\n");
    }
}
