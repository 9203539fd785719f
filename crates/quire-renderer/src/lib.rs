//! Markdown to HTML renderer for quire documentation pages.
//!
//! This crate provides a [`MarkdownRenderer`] that converts pulldown-cmark
//! events to HTML, assigns unique IDs to headings, and collects them for a
//! table of contents. Fenced code blocks go through pluggable
//! [`CodeBlockProcessor`]s; [`SyntaxHighlighter`] is the syntect-backed one.
//!
//! # Example
//!
//! ```
//! use quire_renderer::{MarkdownRenderer, SyntaxHighlighter};
//!
//! let highlighter = SyntaxHighlighter::new("base16-ocean.dark").unwrap();
//! let result = MarkdownRenderer::new()
//!     .with_heading_anchors(true)
//!     .with_processor(highlighter)
//!     .render_markdown("# Hello\n\n```rust\nfn main() {}\n```");
//!
//! assert_eq!(result.headings[0].id, "hello");
//! assert!(result.html.contains("data-line"));
//! ```

mod code_block;
mod highlight;
mod html;
mod renderer;
mod state;
mod util;

pub use code_block::{CodeBlockProcessor, FenceInfo, ProcessResult};
pub use highlight::{HighlightError, SyntaxHighlighter};
pub use html::LinkBase;
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{Heading, escape_html, slugify};
pub use util::page_url;
