//! Sidebar navigation tree built from the content directory.

use std::path::{Path, PathBuf};

use quire_renderer::page_url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DocError;
use crate::frontmatter::read_front_matter;
use crate::walk::{DirListing, file_stem, list_dir};

/// Default URL prefix for documentation pages.
pub const DEFAULT_BASE_PATH: &str = "/docs";

/// A node in the navigation tree.
///
/// Serializes as `{"type": "file", "name": ..., "path": ...}` or
/// `{"type": "directory", "name": ..., "children": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavNode {
    /// A Markdown page.
    File {
        /// Display name.
        name: String,
        /// Site URL of the page.
        path: String,
    },
    /// A directory with its own pages and subdirectories.
    Directory {
        /// Display name.
        name: String,
        /// Files first, then subdirectories.
        children: Vec<NavNode>,
    },
}

impl NavNode {
    /// Display name of the node.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Directory { name, .. } => name,
        }
    }
}

/// Builds the navigation tree by walking the content directory.
///
/// # Example
///
/// ```no_run
/// use quire_docs::NavTreeBuilder;
///
/// let tree = NavTreeBuilder::new("content/docs").base_path("/docs").build()?;
/// println!("{} top-level entries", tree.len());
/// # Ok::<(), quire_docs::DocError>(())
/// ```
#[derive(Clone, Debug)]
pub struct NavTreeBuilder {
    root: PathBuf,
    base_path: String,
}

impl NavTreeBuilder {
    /// Create a builder for the given content root with the `/docs` base path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_path: DEFAULT_BASE_PATH.to_owned(),
        }
    }

    /// Set the URL prefix for page paths.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Walk the content root and build the tree.
    ///
    /// A missing root, or a directory that disappears mid-walk, yields no
    /// entries at that level.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Io`] for unreadable directories or files and
    /// [`DocError::FrontMatter`] for malformed front matter.
    pub fn build(&self) -> Result<Vec<NavNode>, DocError> {
        let tree = self.build_dir(&self.root, "")?;
        tracing::debug!(root = %self.root.display(), entries = tree.len(), "Built navigation tree");
        Ok(tree)
    }

    fn build_dir(&self, dir: &Path, rel_dir: &str) -> Result<Vec<NavNode>, DocError> {
        let Some(DirListing { files, dirs }) = list_dir(dir)? else {
            return Ok(Vec::new());
        };

        let mut nodes = Vec::with_capacity(files.len() + dirs.len());

        for file_name in &files {
            let stem = file_stem(file_name);
            let front_matter = read_front_matter(&dir.join(file_name))?;
            let name = front_matter
                .get("title")
                .and_then(title_text)
                .unwrap_or_else(|| format_title(stem));

            let rel = join_rel(rel_dir, stem);
            // Only the root index maps to the bare base path
            let path = if rel == "index" {
                page_url(&self.base_path, "")
            } else {
                page_url(&self.base_path, &rel)
            };
            nodes.push(NavNode::File { name, path });
        }

        for dir_name in &dirs {
            let children = self.build_dir(&dir.join(dir_name), &join_rel(rel_dir, dir_name))?;
            nodes.push(NavNode::Directory {
                name: format_title(dir_name),
                children,
            });
        }

        Ok(nodes)
    }
}

/// Turn a file or directory name into a display title.
///
/// Hyphens become spaces and the first letter is capitalized:
/// `quick-tips` becomes `Quick tips`.
#[must_use]
pub fn format_title(name: &str) -> String {
    let spaced = name.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

/// Front matter `title` as display text, if present and non-empty.
fn title_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn join_rel(rel_dir: &str, name: &str) -> String {
    if rel_dir.is_empty() {
        name.to_owned()
    } else {
        format!("{rel_dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn file(name: &str, path: &str) -> NavNode {
        NavNode::File {
            name: name.to_owned(),
            path: path.to_owned(),
        }
    }

    fn directory(name: &str, children: Vec<NavNode>) -> NavNode {
        NavNode::Directory {
            name: name.to_owned(),
            children,
        }
    }

    #[test]
    fn test_format_title() {
        assert_eq!(format_title("quick-tips"), "Quick tips");
        assert_eq!(format_title("api"), "Api");
        assert_eq!(format_title("getting-started-guide"), "Getting started guide");
        assert_eq!(format_title("2024-notes"), "2024 notes");
        assert_eq!(format_title("élan"), "Élan");
        assert_eq!(format_title(""), "");
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tree = NavTreeBuilder::new(dir.path().join("missing")).build().unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_root_files_index_first_with_titles() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.md"), "---\ntitle: Home\n---\n").unwrap();
        fs::write(dir.path().join("b.md"), "# B").unwrap();
        fs::write(dir.path().join("a.md"), "---\ntitle: ''\n---\n").unwrap();

        let tree = NavTreeBuilder::new(dir.path()).build().unwrap();
        assert_eq!(
            tree,
            vec![
                file("Home", "/docs"),
                file("A", "/docs/a"),
                file("B", "/docs/b"),
            ]
        );
    }

    #[test]
    fn test_root_index_without_title() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.md"), "# Welcome").unwrap();

        let tree = NavTreeBuilder::new(dir.path()).build().unwrap();
        assert_eq!(tree, vec![file("Index", "/docs")]);
    }

    #[test]
    fn test_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let guide = dir.path().join("user-guide");
        fs::create_dir_all(guide.join("advanced-topics")).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("intro.md"), "").unwrap();
        fs::write(guide.join("index.md"), "").unwrap();
        fs::write(guide.join("quick-tips.md"), "").unwrap();
        fs::write(guide.join("advanced-topics").join("tuning.md"), "+++\ntitle = \"Tuning\"\n+++\n").unwrap();

        let tree = NavTreeBuilder::new(dir.path()).build().unwrap();
        assert_eq!(
            tree,
            vec![
                file("Intro", "/docs/intro"),
                directory("Empty", vec![]),
                directory(
                    "User guide",
                    vec![
                        file("Index", "/docs/user-guide/index"),
                        file("Quick tips", "/docs/user-guide/quick-tips"),
                        directory(
                            "Advanced topics",
                            vec![file("Tuning", "/docs/user-guide/advanced-topics/tuning")]
                        ),
                    ]
                ),
            ]
        );
    }

    #[test]
    fn test_mixed_case_names_sort_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["api.md", "FAQ.md", "Zebra.md", "beta.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let tree = NavTreeBuilder::new(dir.path()).build().unwrap();
        let names: Vec<_> = tree.iter().map(NavNode::name).collect();
        assert_eq!(names, ["Api", "Beta", "FAQ", "Zebra"]);
    }

    #[test]
    fn test_only_directories_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();

        let tree = NavTreeBuilder::new(dir.path()).build().unwrap();
        assert_eq!(tree, vec![directory("Alpha", vec![]), directory("Zeta", vec![])]);
    }

    #[test]
    fn test_hidden_entries_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".notes.md"), "").unwrap();
        fs::create_dir(dir.path().join(".drafts")).unwrap();
        fs::write(dir.path().join(".drafts").join("wip.md"), "").unwrap();
        fs::write(dir.path().join("setup.md"), "").unwrap();

        let tree = NavTreeBuilder::new(dir.path()).build().unwrap();
        assert_eq!(tree, vec![file("Setup", "/docs/setup")]);
    }

    #[test]
    fn test_custom_base_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.md"), "").unwrap();
        fs::write(dir.path().join("setup.md"), "").unwrap();

        let tree = NavTreeBuilder::new(dir.path()).base_path("/").build().unwrap();
        assert_eq!(tree, vec![file("Index", "/"), file("Setup", "/setup")]);

        let tree = NavTreeBuilder::new(dir.path())
            .base_path("/handbook")
            .build()
            .unwrap();
        assert_eq!(tree[1], file("Setup", "/handbook/setup"));
    }

    #[test]
    fn test_malformed_front_matter_propagates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.md"), "---\ntitle: [x\n---\n").unwrap();

        let err = NavTreeBuilder::new(dir.path()).build().unwrap_err();
        assert!(matches!(err, DocError::FrontMatter { .. }));
    }

    #[test]
    fn test_numeric_title_is_used() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("release.md"), "---\ntitle: 2024\n---\n").unwrap();

        let tree = NavTreeBuilder::new(dir.path()).build().unwrap();
        assert_eq!(tree, vec![file("2024", "/docs/release")]);
    }

    #[test]
    fn test_serialized_shape() {
        let tree = vec![
            file("Home", "/docs"),
            directory("Guide", vec![file("Setup", "/docs/guide/setup")]),
        ];
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!([
                {"type": "file", "name": "Home", "path": "/docs"},
                {"type": "directory", "name": "Guide", "children": [
                    {"type": "file", "name": "Setup", "path": "/docs/guide/setup"}
                ]}
            ])
        );
    }

    #[test]
    fn test_node_name() {
        assert_eq!(file("Setup", "/docs/setup").name(), "Setup");
        assert_eq!(directory("Guide", vec![]).name(), "Guide");
    }
}
