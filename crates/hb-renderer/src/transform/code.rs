//! Code block stages: raw-source stash, titles, title icons, `raw` attribute.

use super::{Transform, TransformContext};
use crate::error::CompileError;
use crate::tree::{Document, Element, Node};

/// Stash each code block's raw source on its `pre`.
///
/// Runs before highlighting, which replaces the code text with markup.
pub struct PreProcess;

impl Transform for PreProcess {
    fn name(&self) -> &'static str {
        "pre-process"
    }

    fn apply(&self, doc: &mut Document, _: &mut TransformContext) -> Result<(), CompileError> {
        doc.for_each_element_mut(|el| {
            if el.tag != "pre" {
                return;
            }
            let source = match el.first_element_child() {
                Some(code) if code.tag == "code" => code.text_content(),
                _ => return,
            };
            el.raw = Some(source);
        });
        Ok(())
    }
}

/// Turn `lang:title` fence info into a `div.code-title` before the block.
pub struct CodeTitles;

impl Transform for CodeTitles {
    fn name(&self) -> &'static str {
        "code-titles"
    }

    fn apply(&self, doc: &mut Document, _: &mut TransformContext) -> Result<(), CompileError> {
        doc.for_each_child_list_mut(|nodes| {
            let mut i = 0;
            while i < nodes.len() {
                if let Some(title) = nodes[i].as_element_mut().and_then(take_code_title) {
                    nodes.insert(
                        i,
                        Element::new("div")
                            .with_attr("class", "code-title")
                            .with_child(Node::Text(title))
                            .into(),
                    );
                    i += 1;
                }
                i += 1;
            }
        });
        Ok(())
    }
}

/// Strip the title from a `pre > code.language-x:title` class and return it.
fn take_code_title(pre: &mut Element) -> Option<String> {
    if pre.tag != "pre" {
        return None;
    }
    let code = pre.first_element_child_mut()?;
    let info = code.attr("class")?.strip_prefix("language-")?;
    let (language, title) = info.split_once(':')?;
    if title.is_empty() {
        return None;
    }
    let (language, title) = (language.to_owned(), title.to_owned());

    if language.is_empty() {
        code.attrs.retain(|(name, _)| name != "class");
    } else {
        code.set_attr("class", format!("language-{language}"));
    }
    Some(title)
}

/// Prepend a devicon to code titles whose file extension is recognized.
pub struct CodeIcons;

impl Transform for CodeIcons {
    fn name(&self) -> &'static str {
        "code-icons"
    }

    fn apply(&self, doc: &mut Document, _: &mut TransformContext) -> Result<(), CompileError> {
        doc.for_each_element_mut(|el| {
            if el.tag != "div" || !el.has_class("code-title") {
                return;
            }
            let title = el.text_content();
            let Some(icon) = title.rsplit_once('.').and_then(|(_, ext)| icon_for_extension(ext))
            else {
                return;
            };
            el.children.insert(
                0,
                Element::new("i")
                    .with_attr("class", format!("devicon-{icon}-plain code-icon"))
                    .into(),
            );
        });
        Ok(())
    }
}

/// Devicon name for a file extension, if one exists.
pub fn icon_for_extension(ext: &str) -> Option<&'static str> {
    let icon = match ext.to_ascii_lowercase().as_str() {
        "ts" => "typescript",
        "js" | "mjs" | "cjs" => "javascript",
        "tsx" | "jsx" => "react",
        "py" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" => "kotlin",
        "swift" => "swift",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cplusplus",
        "cs" => "csharp",
        "dart" => "dart",
        "html" => "html5",
        "css" => "css3",
        "scss" => "sass",
        "json" => "json",
        "md" | "mdx" => "markdown",
        "sh" | "bash" => "bash",
        "yml" | "yaml" => "yaml",
        "toml" => "toml",
        "sql" => "azuresqldatabase",
        "dockerfile" => "docker",
        _ => return None,
    };
    Some(icon)
}

/// Expose the stashed raw source as the `raw` attribute of every `pre`.
pub struct PostProcess;

impl Transform for PostProcess {
    fn name(&self) -> &'static str {
        "post-process"
    }

    fn apply(&self, doc: &mut Document, _: &mut TransformContext) -> Result<(), CompileError> {
        doc.for_each_element_mut(|el| {
            if el.tag == "pre" {
                let raw = el.raw.take().unwrap_or_default();
                el.set_attr("raw", raw);
            }
        });
        Ok(())
    }
}
