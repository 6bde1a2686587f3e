//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_storage::{FsStorage, Storage};
use quill_template::{Engine, EngineConfig};

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use render::RenderArgs;

/// Site options shared by every command.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site root directory (overrides config).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Base URL: "relative" or an absolute prefix (overrides config).
    #[arg(long, env = "QUILL_URL")]
    url: Option<String>,

    /// Dev mode: load Tailwind from the CDN and inline the stylesheet.
    #[arg(long)]
    dev: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl SiteArgs {
    /// Load configuration with command-line overrides applied.
    pub(crate) fn load_config(&self, output_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            root: self.root.clone(),
            output_dir,
            url: self.url.clone(),
            dev: self.dev.then_some(true),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Storage rooted at the configured site directory.
pub(crate) fn site_storage(config: &Config) -> Arc<dyn Storage> {
    Arc::new(FsStorage::new(config.site_resolved.root.clone()))
}

/// Engine over `storage` configured from `config`.
pub(crate) fn engine(config: &Config, storage: Arc<dyn Storage>) -> Engine {
    Engine::new(
        storage,
        EngineConfig {
            dev: config.build.dev,
            url: config.build.url.clone(),
            max_depth: config.template.max_depth,
            sort_key: config.template.sort_key.clone(),
        },
    )
}
