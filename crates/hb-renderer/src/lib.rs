//! MDX-flavoured markdown compiler.
//!
//! Turns a raw document (YAML frontmatter + GFM markdown + capitalized
//! component tags) into a typed frontmatter record and a rendering-ready
//! [`Document`] tree:
//!
//! 1. GFM parse and component binding ([`Compiler`] via the tree builder)
//! 2. raw-source stash on code blocks ([`transform::PreProcess`])
//! 3. code titles from `lang:title` fences ([`transform::CodeTitles`])
//! 4. language icons on titles ([`transform::CodeIcons`])
//! 5. syntax highlighting ([`transform::Highlight`])
//! 6. heading ids ([`transform::HeadingSlugs`])
//! 7. heading self-links ([`transform::AutolinkHeadings`])
//! 8. `raw` attribute on every `pre` ([`transform::PostProcess`])
//!
//! Frontmatter and TOC extraction work on the raw text without compiling.
//!
//! # Example
//!
//! ```
//! use hb_renderer::{Compiler, extract_toc};
//! use serde::Deserialize;
//!
//! #[derive(Default, Deserialize)]
//! struct Meta {
//!     title: Option<String>,
//! }
//!
//! let raw = "---\ntitle: Intro\n---\n## Install\n\n<Note>Back up first.</Note>\n";
//! let doc = Compiler::new().compile::<Meta>(raw).unwrap();
//!
//! assert_eq!(doc.frontmatter.title.as_deref(), Some("Intro"));
//! assert_eq!(extract_toc(raw)[0].href, "#install");
//! assert!(doc.to_html().contains(r#"<h2 id="install">"#));
//! ```

mod builder;
mod compiler;
mod components;
mod error;
mod fence;
mod frontmatter;
mod html;
mod state;
mod toc;
pub mod transform;
mod tree;
mod util;

pub use compiler::{CompiledDocument, Compiler};
pub use components::ComponentKind;
pub use error::CompileError;
pub use frontmatter::{FrontmatterError, extract_frontmatter, parse_frontmatter, split_frontmatter};
pub use html::render_html;
pub use toc::{TocEntry, extract_toc, slugify};
pub use tree::{Component, Document, Element, Node};
pub use util::escape_html;
