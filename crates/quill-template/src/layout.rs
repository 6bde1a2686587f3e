//! `<page>` dereferencing and `<layout>` composition.

use std::path::Path;

use crate::element;
use crate::engine::Engine;
use crate::error::TemplateError;
use crate::frontmatter::Frontmatter;
use crate::paths::{LAYOUTS_DIR, PAGES_DIR};
use crate::placeholder;

impl Engine {
    /// Read a page, following a `<page src="...">` reference into `pages/`.
    pub(crate) fn load_page(&self, path: &Path) -> Result<String, TemplateError> {
        let page = self.storage.read(path)?;

        let src = element::find(&page, "page", 0)
            .and_then(|el| el.attrs.get("src").map(str::to_owned));
        match src {
            Some(src) => Ok(self.storage.read(&Path::new(PAGES_DIR).join(src))?),
            None => Ok(page),
        }
    }

    /// Compose a page with its layout.
    ///
    /// Returns `None` when the page has no `<layout>...</layout>` block.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingLayoutSrc`] when the block has no `src`,
    /// and storage errors for a missing layout or partial.
    pub(crate) fn compose_layout(
        &self,
        page: &str,
        path: &Path,
        frontmatter: Option<&Frontmatter>,
    ) -> Result<Option<String>, TemplateError> {
        let Some(block) = element::find_block(page, "layout", 0) else {
            return Ok(None);
        };
        let Some(src) = block.attrs.get("src") else {
            return Err(TemplateError::MissingLayoutSrc {
                path: path.to_path_buf(),
            });
        };

        let layout = self.storage.read(&Path::new(LAYOUTS_DIR).join(src))?;
        let layout = self.expand_includes(&layout, frontmatter)?;
        let content = self.expand_includes(block.body.unwrap_or_default(), frontmatter)?;

        let mut composed = layout.replacen("{slot}", &content, 1);
        for (name, value) in block.attrs.iter() {
            composed = placeholder::replace_named(&composed, name, value);
        }

        Ok(Some(placeholder::sweep_bare(&composed)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_storage::MockStorage;

    use super::*;
    use crate::testing;

    #[test]
    fn test_page_without_layout_is_unchanged() {
        let (engine, _) = testing::engine(MockStorage::new());
        let page = "<p>{title or 'x'}</p><include src=\"a.html\"/>";

        let composed = engine.compose_layout(page, Path::new("pages/a.html"), None).unwrap();

        assert_eq!(composed, None);
    }

    #[test]
    fn test_compose_layout() {
        let (engine, _) = testing::engine(
            MockStorage::new()
                .with_file(
                    "layouts/main.html",
                    "<title>{title or 'Site'}</title><main>{slot}</main><footer>{year or 2024}</footer>",
                )
                .with_file("includes/hello.html", "<b>{who}</b>"),
        );
        let page = r#"<layout src="main.html" title="Home"><include src="hello.html" who="you"/> on {title}</layout>"#;

        let composed = engine
            .compose_layout(page, Path::new("pages/index.html"), None)
            .unwrap()
            .unwrap();

        assert_eq!(
            composed,
            "<title>Home</title><main><b>you</b> on Home</main><footer>2024</footer>"
        );
    }

    #[test]
    fn test_only_first_slot_is_filled() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("layouts/main.html", "{slot}|{slot}"),
        );

        let composed = engine
            .compose_layout(r#"<layout src="main.html">X</layout>"#, Path::new("p.html"), None)
            .unwrap()
            .unwrap();

        assert_eq!(composed, "X|{slot}");
    }

    #[test]
    fn test_missing_src_is_fatal() {
        let (engine, _) = testing::engine(MockStorage::new());

        let err = engine
            .compose_layout("<layout title=\"x\">body</layout>", Path::new("pages/a.html"), None)
            .unwrap_err();

        assert!(matches!(err, TemplateError::MissingLayoutSrc { .. }));
    }

    #[test]
    fn test_missing_layout_is_fatal() {
        let (engine, _) = testing::engine(MockStorage::new());

        let err = engine
            .compose_layout(r#"<layout src="nope.html">body</layout>"#, Path::new("a.html"), None)
            .unwrap_err();

        assert!(matches!(err, TemplateError::Storage(_)));
    }

    #[test]
    fn test_load_page_follows_page_reference() {
        let (engine, _) = testing::engine(
            MockStorage::new()
                .with_file("pages/alias.html", r#"<page src="real.html"></page>"#)
                .with_file("pages/real.html", "real page"),
        );

        assert_eq!(engine.load_page(Path::new("pages/alias.html")).unwrap(), "real page");
        assert_eq!(engine.load_page(Path::new("pages/real.html")).unwrap(), "real page");
    }
}
