//! Heading anchors and table of contents extraction.
//!
//! [`slugify`] is the single anchor algorithm shared by [`extract_toc`] and the
//! heading slug stage of the compiler, so TOC links always resolve to the ids
//! the compiled document carries.

use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::builder::parser_options;
use crate::fence::FenceTracker;
use crate::frontmatter::split_frontmatter;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,4})\s(.+)$").expect("valid heading regex"));

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading level (2-4).
    pub level: u8,
    /// Heading text as written in the source.
    pub text: String,
    /// In-page anchor, `#` followed by the heading slug.
    pub href: String,
}

/// Convert heading text to an anchor id.
///
/// Lower-cases the text, replaces every run of whitespace with a single `-`,
/// then drops every character outside `[a-z0-9-]`.
///
/// # Examples
///
/// ```
/// use hb_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("What's new in v2.0?"), "whats-new-in-v20");
/// assert_eq!(slugify("A & B"), "a--b");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }
    slug
}

/// Extract level 2-4 ATX headings from a raw document.
///
/// Frontmatter is skipped, as are lines inside fenced code blocks. Entries
/// keep document order and are not deduplicated: two headings with the same
/// text yield the same anchor.
///
/// # Examples
///
/// ```
/// use hb_renderer::extract_toc;
///
/// let toc = extract_toc("---\ntitle: Intro\n---\n## Getting Started\n\n### Setup Steps\n");
/// assert_eq!(toc.len(), 2);
/// assert_eq!(toc[0].href, "#getting-started");
/// assert_eq!(toc[1].level, 3);
/// ```
#[must_use]
pub fn extract_toc(raw: &str) -> Vec<TocEntry> {
    let (_, body) = split_frontmatter(raw);
    let resolved = heading_texts(body);
    let mut fence = FenceTracker::new();
    let mut entries = Vec::new();
    let mut offset = 0;

    for raw_line in body.split_inclusive('\n') {
        let start = offset;
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);
        if fence.is_code_line(line) {
            continue;
        }
        let Some(caps) = HEADING_RE.captures(line) else {
            continue;
        };

        let marker = &caps[1];
        let text = strip_closing_sequence(caps[2].trim());
        if text.is_empty() {
            continue;
        }

        let plain = match resolved.get(&start) {
            Some(plain) => plain.clone(),
            None => heading_texts(&format!("{marker} {text}"))
                .remove(&0)
                .unwrap_or_default(),
        };
        #[allow(clippy::cast_possible_truncation)]
        let level = marker.len() as u8;
        entries.push(TocEntry {
            level,
            text: text.to_owned(),
            href: format!("#{}", slugify(&plain)),
        });
    }
    entries
}

/// Drop an optional ATX closing sequence (`## Title ##`).
fn strip_closing_sequence(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.len() == text.len() {
        return text;
    }
    if without.is_empty() {
        return "";
    }
    if without.ends_with(char::is_whitespace) {
        without.trim_end()
    } else {
        text
    }
}

/// Visible text of every heading in `body`, keyed by the byte offset where
/// the heading starts.
///
/// Parsed with the compiler's options so inline markup, entities and
/// footnote references resolve the same way. Image alt text and footnote
/// reference markers are not part of the text.
fn heading_texts(body: &str) -> HashMap<usize, String> {
    let mut texts = HashMap::new();
    let mut current: Option<(usize, String)> = None;
    let mut image_depth = 0usize;

    for (event, range) in Parser::new_ext(body, parser_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { .. }) => current = Some((range.start, String::new())),
            Event::End(TagEnd::Heading(_)) => {
                if let Some((start, text)) = current.take() {
                    texts.insert(start, text);
                }
            }
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            Event::Text(t) | Event::Code(t) if image_depth == 0 => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&t);
                }
            }
            _ => {}
        }
    }
    texts
}
