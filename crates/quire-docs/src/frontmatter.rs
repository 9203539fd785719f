//! Front matter parsing.
//!
//! A Markdown file may start with a metadata block:
//!
//! ```text
//! ---                 +++
//! title: Setup        title = "Setup"
//! ---                 +++
//! ```
//!
//! `---` (or `---yaml`) opens a YAML block, `+++` a TOML block. The block
//! must be closed by the same delimiter on its own line. Files without an
//! opening delimiter have empty front matter.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::DocError;

/// Front matter fields, in file order.
pub type FrontMatter = serde_json::Map<String, Value>;

/// Error parsing a front matter block.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// Opening delimiter without a matching closing line.
    #[error("unterminated front matter block (missing closing `{0}`)")]
    Unterminated(&'static str),
    /// Block is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Block is not valid TOML.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// Block parsed, but is not a key/value mapping.
    #[error("expected a mapping, found {0}")]
    NotMapping(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn from_opening(line: &str) -> Option<Self> {
        match line.trim_end() {
            "---" | "---yaml" => Some(Self::Yaml),
            "+++" => Some(Self::Toml),
            _ => None,
        }
    }

    fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }

    fn is_closing(self, line: &str) -> bool {
        line.trim_end() == self.delimiter()
    }

    fn parse(self, block: &str) -> Result<FrontMatter, FrontMatterError> {
        match self {
            Self::Yaml => {
                if block.trim().is_empty() {
                    return Ok(FrontMatter::new());
                }
                match serde_yaml::from_str::<Value>(block)? {
                    Value::Object(map) => Ok(map),
                    Value::Null => Ok(FrontMatter::new()),
                    other => Err(FrontMatterError::NotMapping(value_kind(&other))),
                }
            }
            Self::Toml => {
                let table: toml::Table = toml::from_str(block)?;
                Ok(table
                    .into_iter()
                    .map(|(key, value)| (key, toml_to_json(value)))
                    .collect())
            }
        }
    }
}

/// Split a Markdown source into front matter and body.
///
/// A leading byte order mark is ignored and CRLF line endings are accepted.
///
/// # Errors
///
/// Returns an error if the block is unterminated, fails to parse, or is not
/// a mapping.
pub fn split(source: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let (first, mut rest) = next_line(source);
    let Some(format) = Format::from_opening(first) else {
        return Ok((FrontMatter::new(), source));
    };

    let block_start = source.len() - rest.len();
    while !rest.is_empty() {
        let line_start = source.len() - rest.len();
        let (line, after) = next_line(rest);
        if format.is_closing(line) {
            let front_matter = format.parse(&source[block_start..line_start])?;
            return Ok((front_matter, after));
        }
        rest = after;
    }

    Err(FrontMatterError::Unterminated(format.delimiter()))
}

/// Read only the front matter of a file, stopping at the closing delimiter.
///
/// The body is never read, so its size and encoding do not matter.
pub(crate) fn read_front_matter(path: &Path) -> Result<FrontMatter, DocError> {
    let io_error = |e: std::io::Error| DocError::io(path, e);

    let file = File::open(path).map_err(io_error)?;
    let mut lines = BufReader::new(file).lines();

    let Some(first) = lines.next().transpose().map_err(io_error)? else {
        return Ok(FrontMatter::new());
    };
    let first = first.strip_prefix('\u{feff}').unwrap_or(&first);
    let Some(format) = Format::from_opening(first) else {
        return Ok(FrontMatter::new());
    };

    let mut block = String::new();
    for line in lines {
        let line = line.map_err(io_error)?;
        if format.is_closing(&line) {
            return format
                .parse(&block)
                .map_err(|e| DocError::front_matter(path, e));
        }
        block.push_str(&line);
        block.push('\n');
    }

    Err(DocError::front_matter(
        path,
        FrontMatterError::Unterminated(format.delimiter()),
    ))
}

/// Split off the first line, without its `\n` or `\r\n` terminator.
fn next_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(i) => (s[..i].trim_end_matches('\r'), &s[i + 1..]),
        None => (s, ""),
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_split_yaml() {
        let source = "---\ntitle: Setup\ntags: [a, b]\n---\n# Body\n";
        let (fm, body) = split(source).unwrap();
        assert_eq!(fm.get("title"), Some(&json!("Setup")));
        assert_eq!(fm.get("tags"), Some(&json!(["a", "b"])));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_yaml_language_tag() {
        let (fm, body) = split("---yaml\ntitle: Tagged\n---\nBody").unwrap();
        assert_eq!(fm.get("title"), Some(&json!("Tagged")));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_preserves_key_order() {
        let (fm, _) = split("---\nzeta: 1\nalpha: 2\n---\n").unwrap();
        let keys: Vec<_> = fm.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_split_toml() {
        let source = "+++\ntitle = \"Setup\"\nweight = 3\ndate = 2024-05-01\n+++\nBody\n";
        let (fm, body) = split(source).unwrap();
        assert_eq!(fm.get("title"), Some(&json!("Setup")));
        assert_eq!(fm.get("weight"), Some(&json!(3)));
        assert_eq!(fm.get("date"), Some(&json!("2024-05-01")));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_split_no_front_matter() {
        let source = "# Just a heading\n\n---\n\nAfter a rule\n";
        let (fm, body) = split(source).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, source);
    }

    #[test]
    fn test_split_bom_and_crlf() {
        let source = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = split(source).unwrap();
        assert_eq!(fm.get("title"), Some(&json!("Windows")));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_split_closing_at_eof() {
        let (fm, body) = split("---\ntitle: Only\n---").unwrap();
        assert_eq!(fm.get("title"), Some(&json!("Only")));
        assert_eq!(body, "");
    }

    #[test]
    fn test_split_empty_block() {
        let (fm, body) = split("---\n---\nBody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_unterminated() {
        let err = split("---\ntitle: Oops\n\n# Body\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated("---")));
        assert!(matches!(
            split("+++\n").unwrap_err(),
            FrontMatterError::Unterminated("+++")
        ));
    }

    #[test]
    fn test_split_invalid_yaml() {
        let err = split("---\ntitle: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_split_invalid_toml() {
        let err = split("+++\ntitle = \n+++\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Toml(_)));
    }

    #[test]
    fn test_split_non_mapping() {
        let err = split("---\n- a\n- b\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::NotMapping("a sequence")));
        assert_eq!(err.to_string(), "expected a mapping, found a sequence");
    }

    #[test]
    fn test_read_front_matter_stops_at_closing_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.md");
        let mut bytes = b"---\ntitle: Header only\n---\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0x00, b'\n']);
        fs::write(&path, bytes).unwrap();

        let fm = read_front_matter(&path).unwrap();
        assert_eq!(fm.get("title"), Some(&json!("Header only")));
    }

    #[test]
    fn test_read_front_matter_without_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.md");
        fs::write(&path, "# Heading\n").unwrap();
        assert!(read_front_matter(&path).unwrap().is_empty());

        fs::write(&path, "").unwrap();
        assert!(read_front_matter(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_front_matter_bom_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.md");
        fs::write(&path, "\u{feff}+++\r\ntitle = \"Toml\"\r\n+++\r\nBody").unwrap();
        let fm = read_front_matter(&path).unwrap();
        assert_eq!(fm.get("title"), Some(&json!("Toml")));
    }

    #[test]
    fn test_read_front_matter_unterminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.md");
        fs::write(&path, "---\ntitle: x\n").unwrap();

        let err = read_front_matter(&path).unwrap_err();
        assert!(matches!(
            err,
            DocError::FrontMatter {
                source: FrontMatterError::Unterminated(_),
                ..
            }
        ));
        assert!(err.to_string().contains("page.md"));
    }
}
