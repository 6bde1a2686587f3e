//! `quill render` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use quill_template::Engine;

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Document to render, relative to the site root (e.g. `pages/index.html`).
    file: PathBuf,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Render a page (`.html`) or content file (`.md`).
fn render(engine: &mut Engine, file: &Path) -> Result<String, CliError> {
    match file.extension().and_then(|e| e.to_str()) {
        Some("md") => Ok(engine.process_content(file)?),
        Some("html") => Ok(engine.process_file(file, None)?),
        _ => Err(CliError::Validation(format!(
            "Cannot render {}: expected an .html page or .md content file",
            file.display()
        ))),
    }
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.site.load_config(None)?;
        let storage = super::site_storage(&config);
        let mut engine = super::engine(&config, storage);

        let html = render(&mut engine, &self.file)?;

        match self.output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, html)?;
                Output::new().wrote(&path);
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}
