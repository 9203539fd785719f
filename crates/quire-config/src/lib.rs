//! Configuration management for quire.
//!
//! Parses `quire.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.content_dir`
//! - `docs.base_path`
//! - `highlight.theme`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the content directory.
    pub content_dir: Option<PathBuf>,
    /// Override the URL base path for docs pages.
    pub base_path: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quire.toml";

/// Content directory used when none is configured.
const DEFAULT_CONTENT_DIR: &str = "content/docs";

/// URL prefix used when none is configured.
const DEFAULT_BASE_PATH: &str = "/docs";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Markdown rendering options.
    pub markdown: MarkdownConfig,
    /// Code block highlighting options.
    pub highlight: HighlightConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    content_dir: Option<String>,
    base_path: Option<String>,
}

/// Resolved documentation configuration.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Root directory holding the `.md` files.
    pub content_dir: PathBuf,
    /// URL path under which docs pages are served (e.g. `/docs`).
    pub base_path: String,
}

/// Markdown rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists).
    pub gfm: bool,
    /// Append `#` anchor links to headings.
    pub heading_anchors: bool,
    /// Pass raw HTML through instead of escaping it.
    pub allow_raw_html: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            heading_anchors: false,
            allow_raw_html: false,
        }
    }
}

/// Code block highlighting options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Name of a bundled syntect theme.
    pub theme: String,
    /// Emit the theme background color on `<pre>`.
    pub keep_background: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_owned(),
            keep_background: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.content_dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_ROOT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.docs_resolved.content_dir.clone_from(content_dir);
        }
        if let Some(base_path) = &settings.base_path {
            self.docs_resolved.base_path = normalize_base_path(base_path);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            markdown: MarkdownConfig::default(),
            highlight: HighlightConfig::default(),
            docs_resolved: DocsConfig {
                content_dir: base.join(DEFAULT_CONTENT_DIR),
                base_path: DEFAULT_BASE_PATH.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_path = &self.docs_resolved.base_path;
        require_non_empty(base_path, "docs.base_path")?;
        if !base_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "docs.base_path must start with '/', got {base_path:?}"
            )));
        }
        require_non_empty(&self.highlight.theme, "highlight.theme")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.docs.content_dir {
            self.docs.content_dir = Some(expand::expand_env(dir, "docs.content_dir")?);
        }
        if let Some(ref base) = self.docs.base_path {
            self.docs.base_path = Some(expand::expand_env(base, "docs.base_path")?);
        }
        self.highlight.theme = expand::expand_env(&self.highlight.theme, "highlight.theme")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let content_dir = self
            .docs
            .content_dir
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_DIR);
        let base_path = self.docs.base_path.as_deref().unwrap_or(DEFAULT_BASE_PATH);

        self.docs_resolved = DocsConfig {
            content_dir: config_dir.join(content_dir),
            base_path: normalize_base_path(base_path),
        };
    }
}

/// Strip trailing slashes so `/docs/` and `/docs` resolve the same way.
///
/// The bare root `/` is kept as-is.
fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() && base.starts_with('/') {
        "/".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/site"));
        assert_eq!(
            config.docs_resolved.content_dir,
            PathBuf::from("/site/content/docs")
        );
        assert_eq!(config.docs_resolved.base_path, "/docs");
        assert!(config.markdown.gfm);
        assert!(!config.markdown.heading_anchors);
        assert!(!config.markdown.allow_raw_html);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert!(config.highlight.keep_background);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.markdown.gfm);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
    }

    #[test]
    fn test_parse_markdown_and_highlight_sections() {
        let toml = r#"
[markdown]
gfm = false
heading_anchors = true

[highlight]
theme = "InspiredGitHub"
keep_background = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.markdown.gfm);
        assert!(config.markdown.heading_anchors);
        assert!(!config.markdown.allow_raw_html);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert!(!config.highlight.keep_background);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
content_dir = "pages"
base_path = "/guide/"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.content_dir,
            PathBuf::from("/project/pages")
        );
        assert_eq!(config.docs_resolved.base_path, "/guide");
    }

    #[test]
    fn test_resolve_paths_defaults() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.content_dir,
            PathBuf::from("/project/content/docs")
        );
        assert_eq!(config.docs_resolved.base_path, "/docs");
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/docs"), "/docs");
        assert_eq!(normalize_base_path("/docs/"), "/docs");
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path("docs"), "docs");
    }

    #[test]
    fn test_apply_cli_settings_content_dir() {
        let mut config = Config::default_with_base(Path::new("/site"));
        let overrides = CliSettings {
            content_dir: Some(PathBuf::from("/elsewhere")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.docs_resolved.content_dir, PathBuf::from("/elsewhere"));
        assert_eq!(config.docs_resolved.base_path, "/docs"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_base_path() {
        let mut config = Config::default_with_base(Path::new("/site"));
        let overrides = CliSettings {
            base_path: Some("/handbook/".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.docs_resolved.base_path, "/handbook");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(
            config.docs_resolved.content_dir,
            PathBuf::from("/site/content/docs")
        );
        assert_eq!(config.docs_resolved.base_path, "/docs");
    }

    #[test]
    fn test_expand_env_vars_content_dir() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUIRE_TEST_DOCS_ROOT", "/mnt/docs");
        }

        let toml = r#"
[docs]
content_dir = "${QUIRE_TEST_DOCS_ROOT}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        // Absolute path replaces the config directory on join
        assert_eq!(config.docs_resolved.content_dir, PathBuf::from("/mnt/docs"));

        unsafe {
            std::env::remove_var("QUIRE_TEST_DOCS_ROOT");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUIRE_TEST_NO_THEME");
        }

        let toml = r#"
[highlight]
theme = "${QUIRE_TEST_NO_THEME}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("highlight.theme"));
    }

    // Validation tests

    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/site"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_root_base_path_passes() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.docs_resolved.base_path = "/".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_base_path_without_leading_slash() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.docs_resolved.base_path = "docs".to_owned();
        assert_validation_error(&config, &["docs.base_path", "'/'"]);
    }

    #[test]
    fn test_validate_base_path_empty() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.docs_resolved.base_path = String::new();
        assert_validation_error(&config, &["docs.base_path", "empty"]);
    }

    #[test]
    fn test_validate_theme_empty() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.highlight.theme = String::new();
        assert_validation_error(&config, &["highlight.theme", "empty"]);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/quire.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quire.toml");
        std::fs::write(&path, "[docs]\ncontent_dir = \"handbook\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(
            config.docs_resolved.content_dir,
            dir.path().join("handbook")
        );
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_rejects_invalid_cli_base_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quire.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            base_path: Some("docs".to_owned()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
