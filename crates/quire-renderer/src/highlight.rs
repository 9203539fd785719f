//! Syntax highlighting for fenced code blocks using syntect.
//!
//! Output follows the `data-line` markup used by common docs themes:
//!
//! ```html
//! <figure data-code-figure="">
//!   <figcaption data-code-title="">main.rs</figcaption>
//!   <pre style="background-color:#2b303b;color:#c0c5ce" data-language="rust" data-theme="..."><code ...>
//!     <span data-line="">...</span>
//!     <span data-line="" class="highlighted" data-highlighted-line="">...</span>
//!   </code></pre>
//! </figure>
//! ```
//!
//! Highlighted words are wrapped in `<mark class="word--highlighted">`, and
//! empty lines contain a single space so they keep their height.

use std::fmt::Write;
use std::ops::Range;
use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::code_block::{CodeBlockProcessor, FenceInfo, ProcessResult};
use crate::state::escape_html;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Error creating a highlighter or highlighting a block.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// Theme name is not one of the bundled themes.
    #[error("Unknown highlight theme '{name}' (available: {available})")]
    UnknownTheme {
        /// Requested theme name.
        name: String,
        /// Comma-separated list of bundled theme names.
        available: String,
    },
    /// syntect failed while highlighting.
    #[error("Highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Code block processor that renders syntax-highlighted HTML.
///
/// Blocks without a language pass through to the plain renderer. Languages
/// syntect does not know are highlighted as plain text, with a warning.
pub struct SyntaxHighlighter {
    theme: &'static Theme,
    theme_name: String,
    keep_background: bool,
    warnings: Vec<String>,
}

impl SyntaxHighlighter {
    /// Create a highlighter for one of the bundled themes.
    ///
    /// # Errors
    ///
    /// Returns [`HighlightError::UnknownTheme`] if `theme_name` is not bundled.
    pub fn new(theme_name: &str) -> Result<Self, HighlightError> {
        let theme = THEMES
            .themes
            .get(theme_name)
            .ok_or_else(|| HighlightError::UnknownTheme {
                name: theme_name.to_owned(),
                available: Self::available_themes().collect::<Vec<_>>().join(", "),
            })?;

        Ok(Self {
            theme,
            theme_name: theme_name.to_owned(),
            keep_background: true,
            warnings: Vec::new(),
        })
    }

    /// Whether to emit the theme background color on `<pre>` (default: true).
    #[must_use]
    pub fn keep_background(mut self, keep: bool) -> Self {
        self.keep_background = keep;
        self
    }

    /// Names of the bundled themes.
    pub fn available_themes() -> impl Iterator<Item = &'static str> {
        THEMES.themes.keys().map(String::as_str)
    }

    /// Highlight `source` and return the full `<figure>` HTML.
    ///
    /// # Errors
    ///
    /// Returns [`HighlightError::Syntect`] if syntect fails on a line.
    pub fn highlight(
        &mut self,
        language: &str,
        fence: &FenceInfo,
        source: &str,
    ) -> Result<String, HighlightError> {
        let syntax = self.find_syntax(language);
        let lang = escape_html(language);
        let theme_attr = escape_html(&self.theme_name);

        let mut out = String::with_capacity(source.len() * 4);
        out.push_str(r#"<figure data-code-figure="">"#);
        if let Some(title) = &fence.title {
            write!(
                out,
                r#"<figcaption data-code-title="" data-language="{lang}" data-theme="{theme_attr}">{}</figcaption>"#,
                escape_html(title)
            )
            .unwrap();
        }
        write!(
            out,
            r#"<pre{} tabindex="0" data-language="{lang}" data-theme="{theme_attr}"><code data-language="{lang}" data-theme="{theme_attr}" style="display:grid">"#,
            self.pre_style()
        )
        .unwrap();

        let mut highlighter = HighlightLines::new(syntax, self.theme);
        for (i, line) in LinesWithEndings::from(source).enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let regions = highlighter.highlight_line(line, &SYNTAXES)?;
            let text = line.trim_end_matches(['\n', '\r']);
            let marks = word_ranges(text, &fence.highlighted_words);

            out.push_str(r#"<span data-line="""#);
            if fence.is_line_highlighted(i + 1) {
                out.push_str(r#" class="highlighted" data-highlighted-line="""#);
            }
            out.push('>');
            if text.is_empty() {
                out.push(' ');
            } else {
                render_line(&regions, text.len(), &marks, &mut out);
            }
            out.push_str("</span>");
        }

        out.push_str("</code></pre></figure>");
        Ok(out)
    }

    fn find_syntax(&mut self, language: &str) -> &'static SyntaxReference {
        let syntaxes: &'static SyntaxSet = &SYNTAXES;
        syntaxes.find_syntax_by_token(language).unwrap_or_else(|| {
            let warning = format!("Unknown code block language '{language}', highlighting as plain text");
            tracing::warn!(language, "Unknown code block language");
            self.warnings.push(warning);
            syntaxes.find_syntax_plain_text()
        })
    }

    /// Inline style for `<pre>`, built from the theme's default colors.
    fn pre_style(&self) -> String {
        let settings = &self.theme.settings;
        let mut parts = Vec::with_capacity(2);
        if self.keep_background
            && let Some(bg) = settings.background
        {
            parts.push(format!("background-color:{}", hex(bg)));
        }
        if let Some(fg) = settings.foreground {
            parts.push(format!("color:{}", hex(fg)));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!(r#" style="{}""#, parts.join(";"))
        }
    }
}

impl CodeBlockProcessor for SyntaxHighlighter {
    fn process(&mut self, fence: &FenceInfo, source: &str, _index: usize) -> ProcessResult {
        let Some(language) = fence.language.as_deref() else {
            return ProcessResult::PassThrough;
        };

        match self.highlight(language, fence, source) {
            Ok(html) => ProcessResult::Inline(html),
            Err(e) => {
                tracing::warn!(language, error = %e, "Failed to highlight code block");
                self.warnings
                    .push(format!("Failed to highlight '{language}' code block: {e}"));
                ProcessResult::PassThrough
            }
        }
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Write one line's styled regions, wrapping marked byte ranges in `<mark>`.
///
/// `text_len` excludes the line terminator that the last region carries.
/// Spans are split at mark boundaries so `<mark>` never straddles a span.
fn render_line(regions: &[(Style, &str)], text_len: usize, marks: &[Range<usize>], out: &mut String) {
    let mut offset = 0;
    let mut mark_open = false;

    for (style, piece) in regions {
        let start = offset;
        let end = (offset + piece.len()).min(text_len);
        offset += piece.len();
        if start >= end {
            continue;
        }

        let text = &piece[..end - start];
        let mut pos = start;
        while pos < end {
            let current = marks.iter().find(|m| m.contains(&pos));
            let next = match current {
                Some(mark) => mark.end.min(end),
                None => marks
                    .iter()
                    .map(|m| m.start)
                    .filter(|&s| s > pos)
                    .min()
                    .map_or(end, |s| s.min(end)),
            };

            match (current.is_some(), mark_open) {
                (true, false) => out.push_str(r#"<mark data-highlighted-chars="" class="word--highlighted">"#),
                (false, true) => out.push_str("</mark>"),
                _ => {}
            }
            mark_open = current.is_some();

            push_token(*style, &text[pos - start..next - start], out);
            pos = next;
        }
    }

    if mark_open {
        out.push_str("</mark>");
    }
}

fn push_token(style: Style, text: &str, out: &mut String) {
    write!(out, r#"<span style="color:{}"#, hex(style.foreground)).unwrap();
    if style.font_style.contains(FontStyle::BOLD) {
        out.push_str(";font-weight:bold");
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out.push_str(";font-style:italic");
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out.push_str(";text-decoration:underline");
    }
    write!(out, r#"">{}</span>"#, escape_html(text)).unwrap();
}

/// Sorted, merged byte ranges of every occurrence of `words` in `text`.
fn word_ranges(text: &str, words: &[String]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = words
        .iter()
        .filter(|w| !w.is_empty())
        .flat_map(|w| text.match_indices(w.as_str()).map(|(i, m)| i..i + m.len()))
        .collect();
    ranges.sort_by_key(|r| r.start);

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

fn hex(color: Color) -> String {
    if color.a == 0xFF {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    } else {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            color.r, color.g, color.b, color.a
        )
    }
}
