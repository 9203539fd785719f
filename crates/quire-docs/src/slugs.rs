//! Enumerating every document slug under the content root.

use std::path::Path;

use crate::error::DocError;
use crate::walk::{file_stem, list_dir};

/// List the slug of every Markdown file under `root`, sorted.
///
/// The root `index.md` appears as `["index"]`, which
/// [`DocLoader::load`](crate::DocLoader::load) resolves to the same file as
/// an empty slug. A missing root yields an empty list.
///
/// # Errors
///
/// Returns [`DocError::Io`] if a directory cannot be read.
pub fn all_slugs(root: &Path) -> Result<Vec<Vec<String>>, DocError> {
    let mut slugs = Vec::new();
    collect(root, &mut Vec::new(), &mut slugs)?;
    slugs.sort();
    Ok(slugs)
}

fn collect(dir: &Path, prefix: &mut Vec<String>, slugs: &mut Vec<Vec<String>>) -> Result<(), DocError> {
    let Some(listing) = list_dir(dir)? else {
        return Ok(());
    };

    for file_name in &listing.files {
        let mut slug = prefix.clone();
        slug.push(file_stem(file_name).to_owned());
        slugs.push(slug);
    }

    for dir_name in listing.dirs {
        let child = dir.join(&dir_name);
        prefix.push(dir_name);
        collect(&child, prefix, slugs)?;
        prefix.pop();
    }

    Ok(())
}
