//! Tree transforms applied after parsing.
//!
//! Each stage rewrites the [`Document`] in place. [`Pipeline::standard`]
//! runs them in the order the rendered output depends on: the raw source is
//! stashed before highlighting replaces code text, and heading ids exist
//! before anchors link to them.

mod code;
mod headings;
mod highlight;

pub use code::{CodeIcons, CodeTitles, PostProcess, PreProcess, icon_for_extension};
pub use headings::{AutolinkHeadings, HeadingSlugs};
pub use highlight::Highlight;

use crate::error::CompileError;
use crate::tree::Document;

/// Shared state passed through every stage of one compilation.
#[derive(Debug, Default)]
pub struct TransformContext {
    /// Non-fatal problems, reported with the compiled document.
    pub warnings: Vec<String>,
}

impl TransformContext {
    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// A single tree rewrite stage.
pub trait Transform: Send + Sync {
    /// Stage name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite the document.
    fn apply(&self, doc: &mut Document, ctx: &mut TransformContext) -> Result<(), CompileError>;
}

/// Ordered list of transforms.
pub struct Pipeline {
    stages: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// Empty pipeline: the parsed tree is serialized as is.
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// The stages every page is compiled with.
    pub fn standard() -> Self {
        Self::empty()
            .with_stage(PreProcess)
            .with_stage(CodeTitles)
            .with_stage(CodeIcons)
            .with_stage(Highlight::new())
            .with_stage(HeadingSlugs)
            .with_stage(AutolinkHeadings)
            .with_stage(PostProcess)
    }

    /// Append a stage.
    #[must_use]
    pub fn with_stage<T: Transform + 'static>(mut self, stage: T) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order, stopping at the first error.
    pub fn run(&self, doc: &mut Document, ctx: &mut TransformContext) -> Result<(), CompileError> {
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), "Applying transform");
            stage.apply(doc, ctx)?;
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}
