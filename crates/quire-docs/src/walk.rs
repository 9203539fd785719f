//! Directory listing shared by the navigation builder and slug enumeration.

use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::DocError;

pub(crate) const INDEX_FILE: &str = "index.md";

/// Markdown files and subdirectories of one directory, sorted.
#[derive(Debug, Default)]
pub(crate) struct DirListing {
    /// `.md` file names, `index.md` first, the rest by [`by_name`].
    pub files: Vec<String>,
    /// Subdirectory names, by [`by_name`].
    pub dirs: Vec<String>,
}

/// List a directory, skipping hidden entries and symlinks.
///
/// Returns `None` if the directory does not exist.
pub(crate) fn list_dir(dir: &Path) -> Result<Option<DirListing>, DocError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DocError::io(dir, e)),
    };

    let mut listing = DirListing::default();
    for entry in entries {
        let entry = entry.map_err(|e| DocError::io(dir, e))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        // file_type() does not follow symlinks
        let file_type = entry.file_type().map_err(|e| DocError::io(entry.path(), e))?;
        if file_type.is_dir() {
            listing.dirs.push(name.to_owned());
        } else if file_type.is_file() && is_markdown(name) {
            listing.files.push(name.to_owned());
        }
    }

    listing
        .files
        .sort_by(|a, b| (a != INDEX_FILE).cmp(&(b != INDEX_FILE)).then_with(|| by_name(a, b)));
    listing.dirs.sort_by(|a, b| by_name(a, b));
    Ok(Some(listing))
}

/// Case-insensitive name order, ties broken by byte order.
fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// File name without the `.md` extension.
pub(crate) fn file_stem(name: &str) -> &str {
    name.strip_suffix(".md").unwrap_or(name)
}

fn is_markdown(name: &str) -> bool {
    Path::new(name).extension().is_some_and(|ext| ext == "md")
}
