//! CLI error types.

use quire_config::ConfigError;
use quire_docs::DocError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Doc(#[from] DocError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Page not found: {0}")]
    PageNotFound(String),
}
