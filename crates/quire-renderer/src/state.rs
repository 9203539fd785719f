//! State structs tracking context during event processing.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::Alignment;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    buffer: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.buffer.clear();
    }

    /// End the current code block and return its content.
    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.buffer)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Inline style attribute for the current cell's column alignment.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for capturing image alt text.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.alt_text.clear();
    }

    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt_text)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// A heading encountered while rendering, for table-of-contents use.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heading {
    /// Value of the heading's `id` attribute.
    pub id: String,
    /// Visible heading text, inline markup stripped.
    pub text: String,
    /// Heading level (1-6).
    pub level: u8,
}

/// A completed heading ready to be written to the output.
pub(crate) struct CompletedHeading {
    pub level: u8,
    pub id: String,
    pub html: String,
}

/// Tracks the heading being rendered and assigns unique IDs.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Level of the heading being processed (None outside headings).
    current_level: Option<u8>,
    /// Plain text buffer (for the ID and heading list).
    text: String,
    /// HTML buffer (with inline formatting).
    html: String,
    headings: Vec<Heading>,
    /// Next suffix to try per base slug.
    id_counts: HashMap<String, usize>,
    /// Every ID handed out so far in this document.
    used_ids: HashSet<String>,
}

impl HeadingState {
    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Finish the current heading, record it, and return what to write.
    pub(crate) fn complete_heading(&mut self) -> Option<CompletedHeading> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let id = self.generate_id(&text);

        self.headings.push(Heading {
            id: id.clone(),
            text: text.trim().to_owned(),
            level,
        });

        Some(CompletedHeading { level, id, html })
    }

    /// Generate an ID unique within this document.
    ///
    /// Repeats of the same slug get `-1`, `-2`, ... suffixes; a suffixed
    /// candidate that collides with a literal heading slug is skipped.
    fn generate_id(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("heading");
        }

        let count = self.id_counts.entry(base.clone()).or_default();
        let mut id = match *count {
            0 => base.clone(),
            n => format!("{base}-{n}"),
        };
        while self.used_ids.contains(&id) {
            *count += 1;
            id = format!("{base}-{count}");
        }
        *count += 1;

        self.used_ids.insert(id.clone());
        id
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub(crate) fn take_headings(&mut self) -> Vec<Heading> {
        std::mem::take(&mut self.headings)
    }
}

/// Convert text to a URL- and ID-safe slug.
///
/// Lowercases, collapses whitespace, dashes and underscores into single
/// dashes, and drops every other non-alphanumeric character.
///
/// ```
/// use quire_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("What's New?"), "whats-new");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
