//! Markdown compiler: frontmatter, tree building and the transform pipeline.

use serde::de::DeserializeOwned;

use crate::builder::TreeBuilder;
use crate::error::CompileError;
use crate::frontmatter::{parse_frontmatter, split_frontmatter};
use crate::html::render_html;
use crate::transform::{Pipeline, TransformContext};
use crate::tree::Document;

/// Output of compiling one document.
#[derive(Clone, Debug)]
pub struct CompiledDocument<F> {
    /// Typed frontmatter record.
    pub frontmatter: F,
    /// Rendering-ready tree.
    pub tree: Document,
    /// Non-fatal problems found while compiling (unknown code languages).
    pub warnings: Vec<String>,
}

impl<F> CompiledDocument<F> {
    /// Serialize the tree to HTML.
    pub fn to_html(&self) -> String {
        render_html(&self.tree)
    }
}

/// Compiles markdown with embedded components into a [`CompiledDocument`].
///
/// A compiler holds no per-document state and can be shared across threads.
pub struct Compiler {
    pipeline: Pipeline,
}

impl Compiler {
    /// Create a compiler with the standard pipeline.
    pub fn new() -> Self {
        Self::with_pipeline(Pipeline::standard())
    }

    /// Create a compiler with a custom pipeline.
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Compile a raw document, frontmatter included.
    ///
    /// Frontmatter is parsed strictly: malformed YAML is an error here, unlike
    /// the lenient [`crate::extract_frontmatter`] used by listings.
    pub fn compile<F>(&self, raw: &str) -> Result<CompiledDocument<F>, CompileError>
    where
        F: DeserializeOwned + Default,
    {
        let frontmatter = parse_frontmatter(raw)?;
        let (_, body) = split_frontmatter(raw);

        let mut tree = TreeBuilder::new().build(body)?;
        let mut ctx = TransformContext::default();
        self.pipeline.run(&mut tree, &mut ctx)?;

        tracing::debug!(
            nodes = tree.children.len(),
            warnings = ctx.warnings.len(),
            "Compiled document"
        );

        Ok(CompiledDocument {
            frontmatter,
            tree,
            warnings: ctx.warnings,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
