//! Shared utility functions for markdown rendering.

use pulldown_cmark::HeadingLevel;

/// Join a docs base path and a content-relative page path into a site URL.
///
/// `base_path` is a normalized URL prefix (`/docs`, or `/` for the site
/// root). `rel` has no leading slash; an empty `rel` is the base itself.
///
/// # Examples
///
/// ```
/// use quire_renderer::page_url;
///
/// assert_eq!(page_url("/docs", "guide/setup"), "/docs/guide/setup");
/// assert_eq!(page_url("/docs", ""), "/docs");
/// assert_eq!(page_url("/", "guide"), "/guide");
/// ```
#[must_use]
pub fn page_url(base_path: &str, rel: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let rel = rel.trim_matches('/');
    match (base.is_empty(), rel.is_empty()) {
        (true, true) => "/".to_owned(),
        (_, true) => base.to_owned(),
        _ => format!("{base}/{rel}"),
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
