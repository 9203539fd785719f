//! Loading a single document by slug.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use quire_renderer::{Heading, LinkBase, MarkdownRenderer, SyntaxHighlighter};
use serde::Serialize;
use serde_json::Value;

use crate::error::DocError;
use crate::frontmatter::{self, FrontMatter};
use crate::nav::DEFAULT_BASE_PATH;

/// Default syntax highlighting theme.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Result fields that front matter keys may not override.
const RESERVED_KEYS: [&str; 3] = ["slug", "contentHtml", "headings"];

/// A document converted to HTML.
///
/// Front matter fields are flattened next to the rendered fields when
/// serialized:
///
/// ```json
/// {"slug": ["guide"], "contentHtml": "<h1 ...", "headings": [...], "title": "Guide"}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDoc {
    /// Slug the document was requested with.
    pub slug: Vec<String>,
    /// Rendered HTML body.
    pub content_html: String,
    /// Headings in document order.
    pub headings: Vec<Heading>,
    /// Front matter fields, unvalidated.
    #[serde(flatten)]
    pub front_matter: FrontMatter,
}

impl RenderedDoc {
    /// Front matter `title`, if it is a string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.front_matter.get("title").and_then(Value::as_str)
    }

    /// Front matter `description`, if it is a string.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.front_matter.get("description").and_then(Value::as_str)
    }
}

/// Options controlling Markdown conversion.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// URL prefix used when rewriting relative `.md` links.
    pub base_path: String,
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Append `#` anchor links to headings.
    pub heading_anchors: bool,
    /// Pass raw HTML through instead of escaping it.
    pub allow_raw_html: bool,
    /// Bundled syntect theme name.
    pub theme: String,
    /// Keep the theme background color on code blocks.
    pub keep_background: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_owned(),
            gfm: true,
            heading_anchors: false,
            allow_raw_html: false,
            theme: DEFAULT_THEME.to_owned(),
            keep_background: true,
        }
    }
}

/// Loads Markdown documents from a content directory and renders them.
///
/// Every call reads the file fresh; nothing is cached.
///
/// # Example
///
/// ```no_run
/// use quire_docs::DocLoader;
///
/// let loader = DocLoader::new("content/docs");
/// if let Some(doc) = loader.load(&["guide", "setup"])? {
///     println!("{}", doc.content_html);
/// }
/// # Ok::<(), quire_docs::DocError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DocLoader {
    content_dir: PathBuf,
    options: RenderOptions,
}

impl DocLoader {
    /// Create a loader with default render options.
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            options: RenderOptions::default(),
        }
    }

    /// Replace the render options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Content directory documents are loaded from.
    #[must_use]
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Load and render the document at `slug`.
    ///
    /// An empty slug loads the root `index.md`. Returns `Ok(None)` if no
    /// Markdown file exists for the slug, or if a segment cannot name a
    /// file inside the content directory (empty, hidden with a leading `.`,
    /// or containing a path separator).
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Io`] if the file cannot be read,
    /// [`DocError::FrontMatter`] if its front matter is malformed, and
    /// [`DocError::Highlight`] if the configured theme does not exist.
    pub fn load<S: AsRef<str>>(&self, slug: &[S]) -> Result<Option<RenderedDoc>, DocError> {
        let slug: Vec<String> = slug.iter().map(|s| s.as_ref().to_owned()).collect();
        let Some(path) = self.doc_path(&slug) else {
            tracing::debug!(?slug, "Slug cannot name a content file");
            return Ok(None);
        };

        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Document not found");
                return Ok(None);
            }
            Err(e) => return Err(DocError::io(path, e)),
        }

        let source = fs::read_to_string(&path).map_err(|e| DocError::io(&path, e))?;
        let (mut front_matter, body) =
            frontmatter::split(&source).map_err(|e| DocError::front_matter(&path, e))?;

        for key in RESERVED_KEYS {
            if front_matter.remove(key).is_some() {
                tracing::warn!(path = %path.display(), key, "Ignoring reserved front matter key");
            }
        }

        let mut renderer = self.renderer(&slug)?;
        let result = renderer.render_markdown(body);
        tracing::debug!(
            path = %path.display(),
            headings = result.headings.len(),
            warnings = result.warnings.len(),
            "Rendered document"
        );

        Ok(Some(RenderedDoc {
            slug,
            content_html: result.html,
            headings: result.headings,
            front_matter,
        }))
    }

    /// Resolve a slug to its Markdown file path.
    fn doc_path(&self, slug: &[String]) -> Option<PathBuf> {
        let (last, dirs) = match slug.split_last() {
            Some(parts) => parts,
            None => return Some(self.content_dir.join("index.md")),
        };

        if !slug.iter().all(|segment| is_safe_segment(segment)) {
            return None;
        }

        let mut path = self.content_dir.clone();
        path.extend(dirs);
        path.push(format!("{last}.md"));
        Some(path)
    }

    fn renderer(&self, slug: &[String]) -> Result<MarkdownRenderer, DocError> {
        let highlighter = SyntaxHighlighter::new(&self.options.theme)?
            .keep_background(self.options.keep_background);
        let page_dir = slug.split_last().map(|(_, dirs)| dirs.join("/")).unwrap_or_default();

        Ok(MarkdownRenderer::new()
            .with_gfm(self.options.gfm)
            .with_heading_anchors(self.options.heading_anchors)
            .with_raw_html(self.options.allow_raw_html)
            .with_link_base(LinkBase::new(&self.options.base_path, page_dir))
            .with_processor(highlighter))
    }
}

/// Hidden names are never listed by the nav walk, so they never load either.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.starts_with('.') && !segment.contains(['/', '\\', '\0'])
}
