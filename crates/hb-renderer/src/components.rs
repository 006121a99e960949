//! Closed registry of MDX-style components.
//!
//! Components are written as capitalized JSX-like tags inside markdown:
//!
//! ```text
//! <Note type="warning">
//!
//! Back up your data **first**.
//!
//! </Note>
//!
//! <YouTube videoId="dQw4w9WgXcQ" />
//! ```
//!
//! Any capitalized tag outside the registry fails compilation; lowercase tags
//! are ordinary HTML and pass through untouched.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CompileError;
use crate::fence::FenceTracker;
use crate::util::escape_html;

/// Matches one capitalized tag: `<Name a="b" c={d} />` or `</Name>`.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<(/)?([A-Z][A-Za-z0-9]*)((?:\s+[A-Za-z_][\w:.-]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{[^{}]*\}))?)*)\s*(/)?>"#,
    )
    .expect("valid component tag regex")
});

static PROP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w:.-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^{}]*)\}))?"#)
        .expect("valid prop regex")
});

/// Every component the compiler knows how to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Tabs,
    TabsList,
    TabsTrigger,
    TabsContent,
    Note,
    Stepper,
    StepperItem,
    Files,
    Outlet,
    YouTube,
}

impl ComponentKind {
    /// All registered components.
    pub const ALL: [Self; 10] = [
        Self::Tabs,
        Self::TabsList,
        Self::TabsTrigger,
        Self::TabsContent,
        Self::Note,
        Self::Stepper,
        Self::StepperItem,
        Self::Files,
        Self::Outlet,
        Self::YouTube,
    ];

    /// Look up a component by its tag name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Tag name as written in content files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tabs => "Tabs",
            Self::TabsList => "TabsList",
            Self::TabsTrigger => "TabsTrigger",
            Self::TabsContent => "TabsContent",
            Self::Note => "Note",
            Self::Stepper => "Stepper",
            Self::StepperItem => "StepperItem",
            Self::Files => "Files",
            Self::Outlet => "Outlet",
            Self::YouTube => "YouTube",
        }
    }

    /// Props that must be present and non-empty.
    pub fn required_props(self) -> &'static [&'static str] {
        match self {
            Self::TabsTrigger | Self::TabsContent => &["value"],
            Self::Outlet => &["path"],
            Self::YouTube => &["videoId"],
            Self::Tabs
            | Self::TabsList
            | Self::Note
            | Self::Stepper
            | Self::StepperItem
            | Self::Files => &[],
        }
    }

    /// Check required props.
    pub(crate) fn validate(self, props: &BTreeMap<String, String>) -> Result<(), CompileError> {
        for &prop in self.required_props() {
            if props.get(prop).is_none_or(|v| v.trim().is_empty()) {
                return Err(CompileError::MissingProp {
                    component: self.name(),
                    prop,
                });
            }
        }
        Ok(())
    }
}

/// A component tag found in HTML text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ComponentTag {
    Open {
        name: String,
        props: BTreeMap<String, String>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
}

/// Piece of an HTML fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Fragment<'a> {
    /// Anything that is not a component tag.
    Html(&'a str),
    Tag(ComponentTag),
}

/// Split an HTML fragment into component tags and plain HTML.
pub(crate) fn tokenize(html: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut last = 0;

    for caps in TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            fragments.push(Fragment::Html(&html[last..whole.start()]));
        }
        last = whole.end();

        let name = caps[2].to_owned();
        let tag = if caps.get(1).is_some() {
            ComponentTag::Close { name }
        } else {
            ComponentTag::Open {
                name,
                props: parse_props(caps.get(3).map_or("", |m| m.as_str())),
                self_closing: caps.get(4).is_some(),
            }
        };
        fragments.push(Fragment::Tag(tag));
    }

    if last < html.len() {
        fragments.push(Fragment::Html(&html[last..]));
    }
    fragments
}

fn parse_props(source: &str) -> BTreeMap<String, String> {
    PROP_RE
        .captures_iter(source)
        .map(|caps| {
            let name = caps[1].to_owned();
            let value = if let Some(v) = caps.get(2).or_else(|| caps.get(3)) {
                unescape_attr(v.as_str())
            } else if let Some(expr) = caps.get(4) {
                expression_value(expr.as_str())
            } else {
                "true".to_owned()
            };
            (name, value)
        })
        .collect()
}

/// Value of a `{...}` prop: string literals lose their quotes, anything
/// else is kept as written (`{true}`, `{3}`).
fn expression_value(expr: &str) -> String {
    let expr = expr.trim();
    for quote in ['"', '\'', '`'] {
        if expr.len() >= 2 && expr.starts_with(quote) && expr.ends_with(quote) {
            return expr[1..expr.len() - 1].to_owned();
        }
    }
    expr.to_owned()
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Write a tag back out with double-quoted props.
fn canonical_tag(tag: &ComponentTag) -> String {
    match tag {
        ComponentTag::Close { name } => format!("</{name}>"),
        ComponentTag::Open {
            name,
            props,
            self_closing,
        } => {
            let mut out = format!("<{name}");
            for (key, value) in props {
                write!(out, " {key}=\"{}\"", escape_html(value)).unwrap();
            }
            out.push_str(if *self_closing { " />" } else { ">" });
            out
        }
    }
}

/// Tags of a line made only of component tags and whitespace.
fn tag_only_line(line: &str) -> Option<Vec<ComponentTag>> {
    let trimmed = line.trim();
    if !trimmed.starts_with('<') {
        return None;
    }
    let mut tags = Vec::new();
    for fragment in tokenize(trimmed) {
        match fragment {
            Fragment::Tag(tag) => tags.push(tag),
            Fragment::Html(text) if text.trim().is_empty() => {}
            Fragment::Html(_) => return None,
        }
    }
    (!tags.is_empty()).then_some(tags)
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Indentation in columns, with tabs advancing to the next multiple of 4.
fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

/// Put component tag lines into blocks of their own.
///
/// Markdown only parses content between HTML tags when the tags sit on their
/// own lines with blank lines around them. This pass adds those blank lines,
/// rewrites each tag with double-quoted props, and removes the indentation
/// that nesting inside a component adds, so indented content is not read as
/// an indented code block. Fenced code is left untouched, and so is indented
/// code outside any component.
pub(crate) fn isolate_component_lines(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() + 64);
    let mut fence = FenceTracker::new();
    // Content indentation per open component, learned from its first line.
    let mut indents: Vec<Option<usize>> = Vec::new();
    let mut need_blank = false;

    for line in markdown.lines() {
        let line = match indents.last_mut() {
            Some(slot) if !line.trim().is_empty() => {
                let base = *slot.get_or_insert_with(|| leading_whitespace(line));
                &line[base.min(leading_whitespace(line))..]
            }
            _ => line,
        };

        let indented_code = indents.is_empty() && indent_width(line) >= 4;
        if !fence.is_code_line(line)
            && !indented_code
            && let Some(tags) = tag_only_line(line)
        {
            if !out.is_empty() && !out.ends_with("\n\n") {
                out.push('\n');
            }
            for tag in &tags {
                match tag {
                    ComponentTag::Open {
                        self_closing: false,
                        ..
                    } => indents.push(None),
                    ComponentTag::Close { .. } => {
                        indents.pop();
                    }
                    ComponentTag::Open { .. } => {}
                }
                out.push_str(&canonical_tag(tag));
                out.push('\n');
            }
            need_blank = true;
            continue;
        }

        if need_blank && !line.trim().is_empty() {
            out.push('\n');
        }
        need_blank = false;
        out.push_str(line);
        out.push('\n');
    }
    out
}
