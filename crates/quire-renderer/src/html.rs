//! HTML output helpers: plain code blocks, images and link resolution.

use std::fmt::Write;

use crate::state::escape_html;
use crate::util::page_url;

/// Where the page being rendered lives, for resolving relative `.md` links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkBase {
    /// Site URL prefix of the docs root (e.g. `/docs`).
    pub url_prefix: String,
    /// Directory of the current page relative to the content root
    /// (empty at the root, `guide/advanced` for nested pages).
    pub page_dir: String,
}

impl LinkBase {
    /// Create a link base for a page in `page_dir` under `url_prefix`.
    pub fn new(url_prefix: impl Into<String>, page_dir: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            page_dir: page_dir.into(),
        }
    }
}

/// Write a code block that no processor handled.
pub(crate) fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    if let Some(lang) = lang {
        write!(
            out,
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(content)
        )
        .unwrap();
    } else {
        write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
    }
}

pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
}

/// Resolve a markdown link URL to a site URL.
///
/// Rewrites links to other `.md` files so they point at rendered pages:
/// - `./sibling.md` -> `/docs/<page_dir>/sibling`
/// - `../parent.md` -> `/docs/parent`
/// - `sub/index.md` -> `/docs/<page_dir>/sub/index`
/// - `/index.md` -> `/docs`
///
/// External links, fragment-only links, and non-markdown links are returned
/// unchanged.
#[allow(clippy::case_sensitive_file_extension_comparisons)]
pub(crate) fn resolve_link(url: &str, base: &LinkBase) -> String {
    if url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
        || url.starts_with('#')
    {
        return url.to_owned();
    }

    let (path_part, fragment) = match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    };

    let Some(stem) = path_part.strip_suffix(".md") else {
        return url.to_owned();
    };

    let resolved = if let Some(absolute) = stem.strip_prefix('/') {
        resolve_relative_path(absolute, "")
    } else {
        resolve_relative_path(stem, &base.page_dir)
    };

    // Only the root index is served at the bare base path
    let rel = if resolved == "index" { "" } else { &resolved };
    format!("{}{fragment}", page_url(&base.url_prefix, rel))
}

/// Resolve a relative path against a base directory.
///
/// Handles `.` (current), `..` (parent), and plain relative paths. `..` at
/// the root is ignored, so links cannot climb above the content root.
fn resolve_relative_path(relative: &str, base: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();

    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }

    segments.join("/")
}
