//! `quire page` command implementation.

use clap::Args;
use quire_config::Config;

use super::doc_loader;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the page command.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Slug segments of the page (`guide setup` or `guide/setup`); empty for the root index.
    segments: Vec<String>,
}

impl PageArgs {
    /// Render the page and print it as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::PageNotFound`] if no Markdown file matches the slug.
    pub(crate) fn execute(&self, config: &Config, output: &Output) -> Result<(), CliError> {
        let slug = self.slug();
        let doc = doc_loader(config)
            .load(slug.as_slice())?
            .ok_or_else(|| CliError::PageNotFound(display_slug(&slug)))?;
        output.json(&doc)
    }

    fn slug(&self) -> Vec<&str> {
        self.segments
            .iter()
            .flat_map(|segment| segment.split('/'))
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

fn display_slug(slug: &[&str]) -> String {
    format!("/{}", slug.join("/"))
}
