//! Template engine entry points.
//!
//! Provides [`Engine`], which resolves page and content documents through a
//! [`Storage`] rooted at the site directory.

use std::path::Path;
use std::sync::Arc;

use quill_storage::Storage;

use crate::collection::CollectionRegistry;
use crate::error::TemplateError;
use crate::frontmatter::Frontmatter;
use crate::{placeholder, shortcode};

/// Base URL meaning "emit root-relative links".
pub const RELATIVE_URL: &str = "relative";

/// Configuration for [`Engine`].
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Dev mode inlines the stylesheet and loads Tailwind from the CDN.
    pub dev: bool,
    /// Base URL (`relative` or an absolute prefix such as `https://example.com`).
    pub url: String,
    /// Maximum include nesting before expansion fails.
    pub max_depth: usize,
    /// Frontmatter key used to order materialized content collections.
    pub sort_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dev: false,
            url: RELATIVE_URL.to_owned(),
            max_depth: 32,
            sort_key: "date".to_owned(),
        }
    }
}

impl EngineConfig {
    /// URL prefix for generated links: empty in relative mode, otherwise the
    /// base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        if self.url == RELATIVE_URL {
            ""
        } else {
            self.url.trim_end_matches('/')
        }
    }
}

/// Directive resolution engine.
///
/// One engine owns the collection registry for a build run; materialized
/// collections are shared by every document it processes.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use std::sync::Arc;
/// use quill_storage::FsStorage;
/// use quill_template::{Engine, EngineConfig};
///
/// let storage = Arc::new(FsStorage::new(PathBuf::from("site")));
/// let mut engine = Engine::new(storage, EngineConfig::default());
/// let html = engine.process_file(Path::new("pages/index.html"), None)?;
/// let post = engine.process_content(Path::new("content/posts/hello.md"))?;
/// ```
pub struct Engine {
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) config: EngineConfig,
    pub(crate) registry: CollectionRegistry,
}

impl Engine {
    /// Create a new engine over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: EngineConfig) -> Self {
        Self {
            storage,
            config,
            registry: CollectionRegistry::default(),
        }
    }

    /// Resolve a page document into HTML.
    ///
    /// A `<page src>` reference is dereferenced first. Documents without a
    /// `<layout>` block are returned unchanged. Otherwise the layout is
    /// composed, includes expanded, layout attributes and shortcodes
    /// substituted, loops expanded and the document-level `dump`,
    /// `collections.*.json` and `global.*` placeholders resolved.
    ///
    /// # Arguments
    ///
    /// * `path` - Root-relative page path (e.g. `pages/index.html`)
    /// * `frontmatter` - Frontmatter of the content document being rendered, if any
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the layout has no `src`, a layout,
    /// partial or loop collection is missing, or include nesting is too deep.
    pub fn process_file(
        &mut self,
        path: &Path,
        frontmatter: Option<&Frontmatter>,
    ) -> Result<String, TemplateError> {
        let page = self.load_page(path)?;

        let Some(composed) = self.compose_layout(&page, path, frontmatter)? else {
            return Ok(page);
        };

        let html = shortcode::expand(&composed, &self.config, self.storage.as_ref());
        let html = self.materialize_content_loops(&html)?;
        let html = self.expand_loops(&html, frontmatter)?;
        let html = self.resolve_dumps(&html);
        let html = self.resolve_collection_json(&html)?;
        Ok(self.resolve_globals(&html))
    }

    /// Render a placeholder-only string against frontmatter and global data.
    ///
    /// Used for include attribute values.
    pub(crate) fn resolve_value(&self, value: &str, frontmatter: Option<&Frontmatter>) -> String {
        let value = match frontmatter {
            Some(fm) => placeholder::replace_frontmatter(value, fm),
            None => value.to_owned(),
        };
        self.resolve_globals(&value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_storage::MockStorage;
    use serde_json::json;

    use super::*;
    use crate::testing;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert!(!config.dev);
        assert_eq!(config.url, "relative");
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.sort_key, "date");
    }

    #[test]
    fn test_base_url() {
        let mut config = EngineConfig::default();
        assert_eq!(config.base_url(), "");

        config.url = "https://example.com/".to_owned();
        assert_eq!(config.base_url(), "https://example.com");

        config.url = "/blog".to_owned();
        assert_eq!(config.base_url(), "/blog");
    }

    #[test]
    fn test_process_file_without_layout_is_unchanged() {
        let page = concat!(
            "<html><head>{tailwindcss}</head><body>\n",
            "<include src=\"card.html\" title=\"{frontmatter.title}\"/>\n",
            "<ForEach collection=\"fruit\">{fruit.name}</ForEach>\n",
            "<ForEach content=\"posts\">{posts.title}</ForEach>\n",
            "<If condition=\"true\">{title or 'x'}</If> {global.site.name} {dump('a.txt')}\n",
            "{collections.fruit.json} { url('/about') }\n",
            "</body></html>",
        );
        let storage = MockStorage::new()
            .with_file("pages/plain.html", page)
            .with_file("includes/card.html", "<div>{title}</div>")
            .with_file("collections/fruit.json", r#"[{"name": "kiwi"}]"#)
            .with_file("content/global/site.md", "---\nname: Site\n---\n")
            .with_file("a.txt", "dump");
        let (mut engine, storage) = testing::engine(storage);
        let fm = json!({"title": "Hi"}).as_object().cloned().unwrap();

        let html = engine.process_file(Path::new("pages/plain.html"), Some(&fm)).unwrap();

        assert_eq!(html, page);
        assert!(storage.content("collections/content/posts.json").is_none());
    }
}
