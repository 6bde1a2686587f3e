//! `quill build` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use quill_storage::{FsStorage, Storage};
use quill_template::{CONTENT_TEMPLATE, Engine};

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// A document to render and where its HTML goes.
#[derive(Debug, PartialEq, Eq)]
struct Job {
    source: PathBuf,
    target: PathBuf,
    content: bool,
}

/// Output path of a page: `pages/index.html` stays `index.html`, other pages
/// become `<name>/index.html`.
fn page_target(page: &Path) -> PathBuf {
    let rel = page.strip_prefix("pages").unwrap_or(page);
    if rel.file_stem().is_some_and(|stem| stem == "index") {
        return rel.to_path_buf();
    }
    rel.with_extension("").join("index.html")
}

/// Output path of a content file, matching its `link`: `content/a/b.md` →
/// `a/b/index.html`.
fn content_target(content: &Path) -> PathBuf {
    let rel = content.strip_prefix("content").unwrap_or(content);
    rel.with_extension("").join("index.html")
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Every page and content document of the site.
///
/// Content templates and global data files are inputs for other documents
/// and are not rendered on their own.
fn collect_jobs(storage: &dyn Storage) -> Result<Vec<Job>, CliError> {
    let mut jobs = Vec::new();

    for page in storage.walk(Path::new("pages"))? {
        let is_template = page
            .file_name()
            .is_some_and(|name| name == CONTENT_TEMPLATE);
        if has_extension(&page, "html") && !is_template {
            jobs.push(Job {
                target: page_target(&page),
                source: page,
                content: false,
            });
        }
    }

    for content in storage.walk(Path::new("content"))? {
        if has_extension(&content, "md") && !content.starts_with("content/global") {
            jobs.push(Job {
                target: content_target(&content),
                source: content,
                content: true,
            });
        }
    }

    Ok(jobs)
}

/// Render every job, writing results to `out`.
///
/// A failing document is reported and skipped. Returns the number of failures.
fn render_all(engine: &mut Engine, jobs: &[Job], out: &dyn Storage, output: &Output) -> usize {
    let mut failed = 0;

    for job in jobs {
        let rendered = if job.content {
            engine.process_content(&job.source)
        } else {
            engine.process_file(&job.source, None)
        };

        let result = rendered
            .map_err(CliError::from)
            .and_then(|html| out.write(&job.target, &html).map_err(CliError::from));

        match result {
            Ok(()) => {
                tracing::info!(source = %job.source.display(), target = %job.target.display(), "Rendered");
            }
            Err(e) => {
                failed += 1;
                output.failed(&job.source, &e);
            }
        }
    }

    failed
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.site.load_config(self.output_dir.clone())?;
        let output_dir = config.site_resolved.output_dir.clone();

        output.site(&config.site_resolved.root, &output_dir);

        let storage = super::site_storage(&config);
        let jobs = collect_jobs(storage.as_ref())?;
        let mut engine = super::engine(&config, storage);
        let out = FsStorage::new(output_dir.clone());

        let failed = render_all(&mut engine, &jobs, &out, &output);
        output.summary(jobs.len() - failed, jobs.len(), &output_dir);
        if failed > 0 {
            return Err(CliError::Build {
                failed,
                total: jobs.len(),
            });
        }
        Ok(())
    }
}
