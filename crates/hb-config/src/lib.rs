//! Configuration management for Homebase.
//!
//! Parses `homebase.toml` with serde and provides auto-discovery of the
//! config file in the working directory and its parents.
//!
//! ```toml
//! [content]
//! root = "${SITE_DIR:-.}/content"
//!
//! [build]
//! output_dir = "dist"
//!
//! [[routes]]
//! href = "/getting-started"
//! title = "Getting Started"
//!
//! [[routes.items]]
//! href = "/installation"
//! title = "Installation"
//! ```
//!
//! `content.root` and `build.output_dir` support `~` and `${VAR}` /
//! `${VAR:-default}` expansion and are resolved relative to the directory
//! holding the config file. CLI settings can be applied during load via
//! [`CliSettings`].

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "homebase.toml";

const DEFAULT_CONTENT_ROOT: &str = "content";
const DEFAULT_OUTPUT_DIR: &str = "dist";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content root directory.
    pub content_root: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Content section (paths are unexpanded strings from TOML).
    content: ContentConfigRaw,
    /// Build section.
    build: BuildConfigRaw,
    /// Documentation route tree, in declared order.
    pub routes: Vec<RouteConfig>,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ContentConfigRaw {
    root: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct BuildConfigRaw {
    output_dir: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Directory holding `docs/` and `week/`.
    pub root: PathBuf,
}

/// Resolved build configuration.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Directory the `build` command writes rendered pages to.
    pub output_dir: PathBuf,
}

/// A route as declared in `[[routes]]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Single path segment with a leading slash.
    pub href: String,
    /// Display title.
    pub title: String,
    /// Nested `[[routes.items]]`.
    #[serde(default)]
    pub items: Vec<RouteConfig>,
    /// Grouping entry without a page of its own.
    #[serde(default)]
    pub no_link: bool,
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
        /// Config field path (e.g., "`content.root`").
        field: String,
        /// Error message (e.g., "${`SITE_DIR`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `homebase.toml` in the current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after path resolution and take precedence
    /// over config file values.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// Relative paths resolve against `base_dir`.
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve_paths(base_dir)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.content_root {
            self.content_resolved.root.clone_from(root);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfigRaw::default(),
            build: BuildConfigRaw::default(),
            routes: Vec::new(),
            content_resolved: ContentConfig {
                root: base.join(DEFAULT_CONTENT_ROOT),
            },
            build_resolved: BuildConfig {
                output_dir: base.join(DEFAULT_OUTPUT_DIR),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that every route has a non-empty href starting with `/` and a
    /// non-empty title. Structural rules (sibling uniqueness, single
    /// segments) are enforced when the route table is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_routes(&self.routes, "routes")
    }

    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let root = match self.content.root.as_deref() {
            Some(raw) => expand::expand_path(raw, "content.root")?,
            None => DEFAULT_CONTENT_ROOT.to_owned(),
        };
        let output_dir = match self.build.output_dir.as_deref() {
            Some(raw) => expand::expand_path(raw, "build.output_dir")?,
            None => DEFAULT_OUTPUT_DIR.to_owned(),
        };

        // Absolute values replace the base in `join`.
        self.content_resolved = ContentConfig {
            root: config_dir.join(root),
        };
        self.build_resolved = BuildConfig {
            output_dir: config_dir.join(output_dir),
        };
        Ok(())
    }
}

fn validate_routes(routes: &[RouteConfig], field: &str) -> Result<(), ConfigError> {
    for (index, route) in routes.iter().enumerate() {
        let path = format!("{field}[{index}]");
        require_non_empty(&route.href, &format!("{path}.href"))?;
        if !route.href.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "{path}.href must start with `/`, got `{}`",
                route.href
            )));
        }
        require_non_empty(&route.title, &format!("{path}.title"))?;
        validate_routes(&route.items, &format!("{path}.items"))?;
    }
    Ok(())
}
