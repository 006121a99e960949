//! Compilation errors.

use crate::frontmatter::FrontmatterError;

/// Error aborting compilation of a single document.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Frontmatter block is not valid YAML for the requested record.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),

    /// A capitalized tag names no registry component.
    #[error("Unknown component <{name}>")]
    UnknownComponent { name: String },

    /// A component is missing a prop it cannot render without.
    #[error("Component <{component}> is missing required prop `{prop}`")]
    MissingProp {
        component: &'static str,
        prop: &'static str,
    },

    /// Open and close tags do not pair up.
    #[error("Unbalanced component <{name}>: {reason}")]
    UnbalancedComponent { name: String, reason: &'static str },

    /// Highlighter failed on a code block.
    #[error("Syntax highlighting failed for `{language}`: {message}")]
    Highlight { language: String, message: String },
}
