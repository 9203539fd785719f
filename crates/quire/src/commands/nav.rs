//! `quire nav` command implementation.

use quire_config::Config;

use super::nav_builder;
use crate::error::CliError;
use crate::output::Output;

/// Print the navigation tree as JSON.
pub(crate) fn execute(config: &Config, output: &Output) -> Result<(), CliError> {
    let tree = nav_builder(config).build()?;
    output.json(&tree)
}
