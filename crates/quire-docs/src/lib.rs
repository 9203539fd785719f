//! Documentation content for quire: document loading and navigation.
//!
//! The content root is a directory tree of Markdown files. This crate turns
//! it into the two things a docs site needs:
//!
//! - [`DocLoader`] loads one page by slug and renders it to HTML with
//!   heading IDs, a heading list, and highlighted code blocks.
//! - [`NavTreeBuilder`] walks the tree into an ordered [`NavNode`] sidebar.
//!
//! [`all_slugs`] lists every page, for pre-generating a site.
//!
//! # Example
//!
//! ```no_run
//! use quire_docs::{DocLoader, NavTreeBuilder};
//!
//! let nav = NavTreeBuilder::new("content/docs").build()?;
//! let page = DocLoader::new("content/docs").load(&["getting-started"])?;
//! # Ok::<(), quire_docs::DocError>(())
//! ```

mod error;
pub mod frontmatter;
mod loader;
mod nav;
mod slugs;
mod walk;

pub use error::DocError;
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use loader::{DEFAULT_THEME, DocLoader, RenderOptions, RenderedDoc};
pub use nav::{DEFAULT_BASE_PATH, NavNode, NavTreeBuilder, format_title};
pub use quire_renderer::Heading;
pub use slugs::all_slugs;
