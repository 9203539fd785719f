//! Error types for document loading and navigation.

use std::path::PathBuf;

use quire_renderer::HighlightError;

use crate::frontmatter::FrontMatterError;

/// Error returned when loading a document or building navigation fails.
///
/// A missing document or content directory is not an error: the loader
/// returns `Ok(None)` and the navigation builder an empty tree.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// I/O error reading a file or directory.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// File or directory being read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Front matter block could not be parsed.
    #[error("Invalid front matter in {}: {source}", path.display())]
    FrontMatter {
        /// Markdown file containing the block.
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    /// Syntax highlighter could not be created.
    #[error(transparent)]
    Highlight(#[from] HighlightError),
}

impl DocError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn front_matter(path: impl Into<PathBuf>, source: FrontMatterError) -> Self {
        Self::FrontMatter {
            path: path.into(),
            source,
        }
    }
}
