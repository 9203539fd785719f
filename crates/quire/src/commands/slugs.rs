//! `quire slugs` command implementation.

use quire_config::Config;
use quire_docs::all_slugs;

use crate::error::CliError;
use crate::output::Output;

/// Print every page slug, one `a/b/c` path per line.
pub(crate) fn execute(config: &Config, output: &Output) -> Result<(), CliError> {
    for slug in all_slugs(&config.docs_resolved.content_dir)? {
        output.line(&slug.join("/"))?;
    }
    Ok(())
}
