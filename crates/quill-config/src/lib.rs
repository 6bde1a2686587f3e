//! Configuration management for Quill.
//!
//! Parses `quill.toml` configuration files with serde and provides
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
//! - `site.root`
//! - `build.url`
//! - `build.output_dir`

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override site root directory.
    pub root: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override base URL (`relative` or an absolute prefix).
    pub url: Option<String>,
    /// Override dev mode flag.
    pub dev: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Base URL value meaning "emit root-relative links".
pub const RELATIVE_URL: &str = "relative";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Build configuration.
    pub build: BuildConfig,
    /// Template engine configuration.
    pub template: TemplateConfig,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    root: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Site root containing `pages/`, `layouts/`, `includes/`, `content/`.
    pub root: PathBuf,
    /// Directory rendered pages are written to.
    pub output_dir: PathBuf,
}

/// Build configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Base URL for assets and `url()` shortcodes.
    pub url: String,
    /// Output directory, relative to the config file.
    output_dir: Option<String>,
    /// Dev mode inlines the stylesheet and uses the Tailwind CDN.
    pub dev: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            url: RELATIVE_URL.to_owned(),
            output_dir: None,
            dev: false,
        }
    }
}

/// Template engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Maximum include nesting before expansion is aborted.
    pub max_depth: usize,
    /// Frontmatter key used to order materialized content collections.
    pub sort_key: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            sort_key: "date".to_owned(),
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
    /// A field references an environment variable that cannot be read.
    #[error("{field} references ${{{var}}}: {source}")]
    UnsetVar {
        /// Config field path (e.g. `build.url`).
        field: &'static str,
        /// Name of the variable.
        var: String,
        /// Lookup failure.
        source: std::env::VarError,
    },
}

/// Expand `${VAR}` and `${VAR:-default}` references in one field in place.
fn expand_field(value: &mut String, field: &'static str) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }
    let expanded = shellexpand::env(value.as_str())
        .map_err(|e| ConfigError::UnsetVar {
            field,
            var: e.var_name,
            source: e.cause,
        })?
        .into_owned();
    *value = expanded;
    Ok(())
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require the base URL to be `relative`, an http(s) URL or a root-relative prefix.
fn require_base_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if url == RELATIVE_URL
        || url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with('/')
    {
        return Ok(());
    }
    Err(ConfigError::Validation(format!(
        "{field} must be \"{RELATIVE_URL}\", start with http:// or https://, or start with /"
    )))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quill.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
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
        if let Some(root) = &settings.root {
            self.site_resolved.root.clone_from(root);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.site_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(url) = &settings.url {
            self.build.url.clone_from(url);
        }
        if let Some(dev) = settings.dev {
            self.build.dev = dev;
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
            site: SiteConfigRaw::default(),
            build: BuildConfig::default(),
            template: TemplateConfig::default(),
            site_resolved: SiteConfig {
                root: base.to_path_buf(),
                output_dir: base.join("_site"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_build()?;
        self.validate_template()?;
        Ok(())
    }

    fn validate_build(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.build.url, "build.url")?;
        require_base_url(&self.build.url, "build.url")?;
        Ok(())
    }

    fn validate_template(&self) -> Result<(), ConfigError> {
        const MAX_DEPTH_LIMIT: usize = 1000;

        if self.template.max_depth == 0 {
            return Err(ConfigError::Validation(
                "template.max_depth must be greater than 0".to_owned(),
            ));
        }
        if self.template.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "template.max_depth cannot exceed {MAX_DEPTH_LIMIT}"
            )));
        }
        require_non_empty(&self.template.sort_key, "template.sort_key")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(root) = self.site.root.as_mut() {
            expand_field(root, "site.root")?;
        }
        expand_field(&mut self.build.url, "build.url")?;
        if let Some(output_dir) = self.build.output_dir.as_mut() {
            expand_field(output_dir, "build.output_dir")?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let root = match self.site.root.as_deref() {
            Some(root) => config_dir.join(root),
            None => config_dir.to_path_buf(),
        };
        let output_dir = config_dir.join(self.build.output_dir.as_deref().unwrap_or("_site"));

        self.site_resolved = SiteConfig { root, output_dir };
    }

    /// Whether links and assets are emitted root-relative.
    #[must_use]
    pub fn is_relative_url(&self) -> bool {
        self.build.url == RELATIVE_URL
    }
}
