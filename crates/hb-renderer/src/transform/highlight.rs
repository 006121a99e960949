//! Class-based syntax highlighting with syntect.

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::{Transform, TransformContext};
use crate::error::CompileError;
use crate::tree::{Document, Element, Node};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Languages rendered without highlighting and without a warning.
const PLAIN_LANGUAGES: &[&str] = &["text", "plaintext", "plain", "txt", "none"];

/// Replace code text with highlighted spans (`<span class="source rust">…`).
///
/// Unknown languages are left as plain text and reported as warnings.
pub struct Highlight {
    syntax_set: &'static SyntaxSet,
}

impl Highlight {
    pub fn new() -> Self {
        Self {
            syntax_set: &SYNTAX_SET,
        }
    }

    fn highlight(&self, syntax: &SyntaxReference, source: &str) -> Result<String, syntect::Error> {
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            self.syntax_set,
            ClassStyle::Spaced,
        );
        for line in LinesWithEndings::from(source) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }

    fn highlight_block(
        &self,
        pre: &mut Element,
        ctx: &mut TransformContext,
    ) -> Result<(), CompileError> {
        let Some(code) = pre.first_element_child_mut().filter(|c| c.tag == "code") else {
            return Ok(());
        };
        let Some(language) = code
            .attr("class")
            .and_then(|class| class.strip_prefix("language-"))
            .map(str::to_owned)
        else {
            return Ok(());
        };
        if PLAIN_LANGUAGES.contains(&language.to_ascii_lowercase().as_str()) {
            return Ok(());
        }

        let Some(syntax) = self.syntax_set.find_syntax_by_token(&language) else {
            tracing::warn!(language = %language, "No syntax for code block language, leaving it plain");
            ctx.warn(format!("Unknown code block language `{language}`"));
            return Ok(());
        };

        let html = self
            .highlight(syntax, &code.text_content())
            .map_err(|e| CompileError::Highlight {
                language: language.clone(),
                message: e.to_string(),
            })?;
        code.children = vec![Node::Raw(html)];
        pre.set_attr("class", format!("language-{language}"));
        Ok(())
    }
}

impl Default for Highlight {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Highlight {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut TransformContext) -> Result<(), CompileError> {
        let mut result = Ok(());
        doc.for_each_element_mut(|el| {
            if el.tag == "pre" && result.is_ok() {
                result = self.highlight_block(el, ctx);
            }
        });
        result
    }
}
