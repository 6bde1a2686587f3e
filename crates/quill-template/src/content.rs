//! Markdown content documents.
//!
//! A content file is rendered through the page template that matches its
//! location under `pages/`. The template sees the file's frontmatter; the
//! Markdown body becomes `{content}`.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::condition::process_conditions;
use crate::engine::Engine;
use crate::error::TemplateError;
use crate::paths::{CONTENT_DIR, CONTENT_TEMPLATE, PAGES_DIR};
use crate::{frontmatter, placeholder};

/// How many directories, starting with the content file's own, are searched for a template.
const MAX_LOOKUP_LEVELS: usize = 10;

/// Escape single quotes for embedding JSON in a single-quoted string.
fn escape_quotes(json: &str) -> String {
    json.replace('\'', "\\'")
}

impl Engine {
    /// Find the page template for a content file.
    ///
    /// For `content/a/b.md` this is `pages/a/b.html` if it exists. Otherwise,
    /// starting at `pages/a` and walking up while still inside `pages/`, the
    /// first existing of `DIR/[content].html`, `DIR/index.html` and
    /// `PARENT/<name of DIR>.html`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::PageNotFound`] when no template matches.
    pub fn page_for_content(&self, path: &Path) -> Result<PathBuf, TemplateError> {
        let rel = path.strip_prefix(CONTENT_DIR).unwrap_or(path);
        let pages = Path::new(PAGES_DIR);

        let direct = pages.join(rel).with_extension("html");
        if self.storage.exists(&direct) {
            return Ok(direct);
        }

        let mut dir = match rel.parent() {
            Some(parent) => pages.join(parent),
            None => pages.to_path_buf(),
        };

        for _ in 0..MAX_LOOKUP_LEVELS {
            if !dir.starts_with(pages) {
                break;
            }

            let mut candidates = vec![dir.join(CONTENT_TEMPLATE), dir.join("index.html")];
            if dir != pages
                && let (Some(parent), Some(name)) = (dir.parent(), dir.file_name())
            {
                let mut file = name.to_os_string();
                file.push(".html");
                candidates.push(parent.join(file));
            }

            if let Some(found) = candidates.into_iter().find(|c| self.storage.exists(c)) {
                return Ok(found);
            }

            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => break,
            }
        }

        Err(TemplateError::PageNotFound(path.to_path_buf()))
    }

    /// Render a Markdown content file through its page template.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, its frontmatter is
    /// malformed, no page template matches, or rendering the template fails.
    pub fn process_content(&mut self, path: &Path) -> Result<String, TemplateError> {
        let raw = self.storage.read(path)?;
        let doc = frontmatter::parse(&raw).map_err(|e| TemplateError::Frontmatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let fm = doc.attributes;
        let body = doc.body.trim();

        let page = self.page_for_content(path)?;
        tracing::debug!(content = %path.display(), page = %page.display(), "Rendering content");
        let html = self.process_file(&page, Some(&fm))?;

        let toc = quill_markdown::toc(body);
        let markdown = body.replacen("[toc]", &toc.markdown, 1);
        let content = quill_markdown::render(&markdown);

        let html = process_conditions(&html, &fm, "frontmatter");
        let html = placeholder::replace_frontmatter(&html, &fm);

        let toc_json = serde_json::to_string(&toc.entries).map_err(|source| TemplateError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let toc_json = escape_quotes(&toc_json);
        let fm_json = escape_quotes(&Value::Object(fm.clone()).to_string());

        let element = format!(
            "<div id='static-content' style='display:none;' data-toc='{toc_json}' data-frontmatter='{fm_json}'></div>"
        );
        let script = format!(
            "<script>window.toc = JSON.parse('{toc_json}'); window.frontmatter=JSON.parse('{fm_json}');</script>"
        );

        let html = html
            .replacen("{static_content_element}", &element, 1)
            .replacen("</head>", &format!("{script}\n</head>"), 1)
            .replacen("{content}", &content, 1);

        self.expand_includes(&html, Some(&fm))
    }
}
