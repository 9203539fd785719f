//! CLI command implementations.

use std::path::PathBuf;

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_docs::{DocLoader, NavTreeBuilder, RenderOptions};

use crate::error::CliError;

pub(crate) mod nav;
pub(crate) mod page;
pub(crate) mod slugs;

pub(crate) use page::PageArgs;

/// Configuration flags shared by every command.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Content directory holding the Markdown files (overrides config).
    #[arg(short = 's', long, global = true, env = "QUIRE_CONTENT_DIR")]
    content_dir: Option<PathBuf>,

    /// URL prefix for page paths, e.g. `/docs` (overrides config).
    #[arg(long, global = true)]
    base_path: Option<String>,
}

impl ConfigArgs {
    /// Load configuration with the flags applied on top.
    pub(crate) fn load(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            content_dir: self.content_dir.clone(),
            base_path: self.base_path.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::info!(
            config = ?config.config_path,
            content_dir = %config.docs_resolved.content_dir.display(),
            base_path = %config.docs_resolved.base_path,
            "Loaded configuration"
        );
        Ok(config)
    }
}

pub(crate) fn doc_loader(config: &Config) -> DocLoader {
    DocLoader::new(&config.docs_resolved.content_dir).with_options(RenderOptions {
        base_path: config.docs_resolved.base_path.clone(),
        gfm: config.markdown.gfm,
        heading_anchors: config.markdown.heading_anchors,
        allow_raw_html: config.markdown.allow_raw_html,
        theme: config.highlight.theme.clone(),
        keep_background: config.highlight.keep_background,
    })
}

pub(crate) fn nav_builder(config: &Config) -> NavTreeBuilder {
    NavTreeBuilder::new(&config.docs_resolved.content_dir)
        .base_path(config.docs_resolved.base_path.as_str())
}
