//! Code block processor trait and fence info parsing.
//!
//! Processors are registered with the renderer and checked in order when a
//! fenced code block is encountered. The first processor returning a
//! non-`PassThrough` result wins; if none does, the block is rendered as a
//! plain `<pre><code>` element.

use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace the code block with this HTML.
    Inline(String),
    /// Render as a regular code block.
    PassThrough,
}

/// Trait for processing fenced code blocks.
pub trait CodeBlockProcessor {
    /// Process a code block and return the result.
    ///
    /// # Arguments
    ///
    /// * `fence` - Parsed fence info string (language and meta)
    /// * `source` - Raw content of the code block
    /// * `index` - Zero-based index of the block within the document
    fn process(&mut self, fence: &FenceInfo, source: &str, index: usize) -> ProcessResult;

    /// Warnings generated during processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Parsed fence info string.
///
/// Format: ``` ```lang {1,3-5} /word/ title="file.rs" key=value flag ```
///
/// - `{...}` lists 1-based line numbers and ranges to highlight
/// - `/.../` marks a word or phrase to highlight on every line
/// - `title` renders a caption above the block
/// - other `key=value` pairs and bare flags land in `attrs`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FenceInfo {
    /// Language identifier (first token), if any.
    pub language: Option<String>,
    /// Caption text.
    pub title: Option<String>,
    /// Line ranges to mark as highlighted.
    pub highlighted_lines: Vec<RangeInclusive<usize>>,
    /// Words or phrases to mark wherever they occur.
    pub highlighted_words: Vec<String>,
    /// Remaining attributes; bare flags map to an empty string.
    pub attrs: HashMap<String, String>,
}

impl FenceInfo {
    /// Parse a fence info string.
    #[must_use]
    pub fn parse(info: &str) -> Self {
        let info = info.trim();
        let mut fence = Self::default();

        let meta = match info.split_once(char::is_whitespace) {
            _ if info.is_empty() => "",
            _ if info.starts_with(['{', '/']) => info,
            Some((lang, rest)) => {
                fence.language = Some(lang.to_owned());
                rest
            }
            None => {
                fence.language = Some(info.to_owned());
                ""
            }
        };

        fence.parse_meta(meta);
        fence
    }

    /// Whether the given 1-based line is flagged for highlighting.
    #[must_use]
    pub fn is_line_highlighted(&self, line: usize) -> bool {
        self.highlighted_lines.iter().any(|r| r.contains(&line))
    }

    fn parse_meta(&mut self, meta: &str) {
        let mut rest = meta.trim_start();

        while let Some(c) = rest.chars().next() {
            rest = match c {
                '{' => match rest[1..].split_once('}') {
                    Some((ranges, tail)) => {
                        self.highlighted_lines.extend(parse_line_ranges(ranges));
                        tail
                    }
                    None => "",
                },
                '/' => match rest[1..].split_once('/') {
                    Some((word, tail)) => {
                        if !word.is_empty() {
                            self.highlighted_words.push(word.to_owned());
                        }
                        // Occurrence selectors like `/word/1-2` are not supported
                        skip_token(tail)
                    }
                    None => "",
                },
                _ => self.parse_attr(rest),
            }
            .trim_start();
        }
    }

    /// Parse one `key`, `key=value` or `key="quoted value"` token.
    fn parse_attr<'a>(&mut self, input: &'a str) -> &'a str {
        let key_end = input
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(input.len());
        let key = &input[..key_end];
        let rest = &input[key_end..];

        let Some(after_eq) = rest.strip_prefix('=') else {
            self.attrs.insert(key.to_owned(), String::new());
            return rest;
        };

        let (value, tail) = match after_eq.chars().next() {
            Some(quote @ ('"' | '\'')) => match after_eq[1..].split_once(quote) {
                Some((value, tail)) => (value, tail),
                None => (&after_eq[1..], ""),
            },
            _ => {
                let end = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };

        if key == "title" {
            self.title = Some(value.to_owned());
        } else {
            self.attrs.insert(key.to_owned(), value.to_owned());
        }
        tail
    }
}

/// Skip to the next whitespace.
fn skip_token(input: &str) -> &str {
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    &input[end..]
}

/// Parse `1,3-5` into line ranges, ignoring malformed parts.
fn parse_line_ranges(spec: &str) -> Vec<RangeInclusive<usize>> {
    spec.split(',')
        .filter_map(|part| {
            let part = part.trim();
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = start.trim().parse().ok()?;
                    let end = end.trim().parse().ok()?;
                    (start <= end).then_some(start..=end)
                }
                None => part.parse().ok().map(|n| n..=n),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_only() {
        let fence = FenceInfo::parse("rust");
        assert_eq!(fence.language.as_deref(), Some("rust"));
        assert!(fence.highlighted_lines.is_empty());
        assert!(fence.attrs.is_empty());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(FenceInfo::parse(""), FenceInfo::default());
        assert_eq!(FenceInfo::parse("   "), FenceInfo::default());
    }

    #[test]
    fn test_parse_line_ranges() {
        let fence = FenceInfo::parse("js {1,3-5}");
        assert_eq!(fence.language.as_deref(), Some("js"));
        assert_eq!(fence.highlighted_lines, vec![1..=1, 3..=5]);
        assert!(fence.is_line_highlighted(1));
        assert!(!fence.is_line_highlighted(2));
        assert!(fence.is_line_highlighted(4));
        assert!(!fence.is_line_highlighted(6));
    }

    #[test]
    fn test_parse_malformed_ranges_ignored() {
        let fence = FenceInfo::parse("js {x,5-2,7}");
        assert_eq!(fence.highlighted_lines, vec![7..=7]);
    }

    #[test]
    fn test_parse_ranges_without_language() {
        let fence = FenceInfo::parse("{2}");
        assert!(fence.language.is_none());
        assert_eq!(fence.highlighted_lines, vec![2..=2]);
    }

    #[test]
    fn test_parse_highlighted_words() {
        let fence = FenceInfo::parse("rust /carrot/ /two words/");
        assert_eq!(fence.highlighted_words, vec!["carrot", "two words"]);
    }

    #[test]
    fn test_parse_title_with_spaces() {
        let fence = FenceInfo::parse(r#"rust title="src/main.rs file" {2}"#);
        assert_eq!(fence.title.as_deref(), Some("src/main.rs file"));
        assert_eq!(fence.highlighted_lines, vec![2..=2]);
        assert!(!fence.attrs.contains_key("title"));
    }

    #[test]
    fn test_parse_attrs_and_flags() {
        let fence = FenceInfo::parse("py showLineNumbers caption='Demo' format=svg");
        assert_eq!(fence.attrs.get("showLineNumbers"), Some(&String::new()));
        assert_eq!(fence.attrs.get("caption"), Some(&"Demo".to_owned()));
        assert_eq!(fence.attrs.get("format"), Some(&"svg".to_owned()));
    }

    #[test]
    fn test_parse_unterminated_meta_is_tolerated() {
        let fence = FenceInfo::parse(r#"rust {1,2 title="oops"#);
        assert_eq!(fence.language.as_deref(), Some("rust"));
        assert!(fence.highlighted_lines.is_empty());

        let fence = FenceInfo::parse(r#"rust title="open"#);
        assert_eq!(fence.title.as_deref(), Some("open"));
    }
}
