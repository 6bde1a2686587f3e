//! `<include>` expansion.

use std::path::Path;

use crate::element;
use crate::engine::Engine;
use crate::error::TemplateError;
use crate::frontmatter::Frontmatter;
use crate::paths::INCLUDES_DIR;
use crate::placeholder;

impl Engine {
    /// Expand every `<include src="...">` in `text`, recursively.
    ///
    /// Attribute values are resolved against `frontmatter` and global data
    /// before they replace `{attr}` placeholders in the partial. The tag's inner
    /// text replaces `{slot}`. Nested includes inside the expanded partial are
    /// expanded before it is spliced in.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Storage`] for a missing partial and
    /// [`TemplateError::DepthExceeded`] when nesting passes `max_depth`.
    pub(crate) fn expand_includes(
        &self,
        text: &str,
        frontmatter: Option<&Frontmatter>,
    ) -> Result<String, TemplateError> {
        self.expand_includes_at(text, frontmatter, 0)
    }

    fn expand_includes_at(
        &self,
        text: &str,
        frontmatter: Option<&Frontmatter>,
        depth: usize,
    ) -> Result<String, TemplateError> {
        element::replace_each(text, "include", |el| {
            let Some(src) = el.attrs.get("src") else {
                tracing::warn!("Include tag without src attribute left as is");
                return Ok(None);
            };

            if depth >= self.config.max_depth {
                return Err(TemplateError::DepthExceeded {
                    src: src.to_owned(),
                    max_depth: self.config.max_depth,
                });
            }

            let mut partial = self.storage.read(&Path::new(INCLUDES_DIR).join(src))?;

            for (name, value) in el.attrs.iter() {
                let value = self.resolve_value(value, frontmatter);
                partial = placeholder::replace_named(&partial, name, &value);
            }

            partial = partial.replace("{slot}", el.body.unwrap_or_default());
            partial = placeholder::sweep_bare(&partial);

            self.expand_includes_at(&partial, frontmatter, depth + 1).map(Some)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_storage::MockStorage;
    use serde_json::json;

    use super::*;
    use crate::EngineConfig;
    use crate::testing;

    #[test]
    fn test_self_closing_include() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("includes/header.html", "<header>Site</header>"),
        );

        let out = engine
            .expand_includes(r#"<body><include src="header.html"/></body>"#, None)
            .unwrap();

        assert_eq!(out, "<body><header>Site</header></body>");
    }

    #[test]
    fn test_attributes_and_fallbacks() {
        let (engine, _) = testing::engine(MockStorage::new().with_file(
            "includes/button.html",
            "<a class=\"{class or 'btn'}\" href=\"{href}\">{label or 'Click'}</a>",
        ));

        let out = engine
            .expand_includes(r#"<include src="button.html" href="/go" />"#, None)
            .unwrap();

        assert_eq!(out, r#"<a class="btn" href="/go">Click</a>"#);
    }

    #[test]
    fn test_slot_substituted_exactly_once() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("includes/card.html", "<div>{slot}</div>"),
        );

        let out = engine
            .expand_includes(r#"<include src="card.html"><h1>{slot}</h1></include>"#, None)
            .unwrap();

        assert_eq!(out, "<div><h1>{slot}</h1></div>");
    }

    #[test]
    fn test_attribute_values_resolve_frontmatter() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("includes/title.html", "<h1>{heading}</h1>"),
        );
        let fm = json!({"title": "Hello"});

        let out = engine
            .expand_includes(
                r#"<include src="title.html" heading="{frontmatter.title}!"/>"#,
                fm.as_object(),
            )
            .unwrap();

        assert_eq!(out, "<h1>Hello!</h1>");
    }

    #[test]
    fn test_attribute_values_resolve_globals() {
        let (engine, _) = testing::engine(
            MockStorage::new()
                .with_file("includes/title.html", "<h1>{heading}</h1>")
                .with_file("content/global/settings.md", "---\ntitle: My Site\n---\n"),
        );

        let out = engine
            .expand_includes(
                r#"<include src="title.html" heading="{global.settings.title}"/>"#,
                None,
            )
            .unwrap();

        assert_eq!(out, "<h1>My Site</h1>");
    }

    #[test]
    fn test_nested_includes() {
        let (engine, _) = testing::engine(
            MockStorage::new()
                .with_file("includes/outer.html", r#"<nav><include src="inner.html" name="{name}"/></nav>"#)
                .with_file("includes/inner.html", "<span>{name}</span>"),
        );

        let out = engine
            .expand_includes(r#"<include src="outer.html" name="Home"/>"#, None)
            .unwrap();

        assert_eq!(out, "<nav><span>Home</span></nav>");
    }

    #[test]
    fn test_missing_partial_is_fatal() {
        let (engine, _) = testing::engine(MockStorage::new());

        let err = engine
            .expand_includes(r#"<include src="missing.html"/>"#, None)
            .unwrap_err();

        assert!(matches!(err, TemplateError::Storage(ref e) if e.is_not_found()));
    }

    #[test]
    fn test_self_including_partial_fails() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("includes/loop.html", r#"<include src="loop.html"/>"#),
        );

        let err = engine
            .expand_includes(r#"<include src="loop.html"/>"#, None)
            .unwrap_err();

        assert!(matches!(
            err,
            TemplateError::DepthExceeded { ref src, max_depth: 32 } if src == "loop.html"
        ));
    }

    #[test]
    fn test_depth_limit_is_configurable() {
        let config = EngineConfig {
            max_depth: 1,
            ..Default::default()
        };
        let (engine, _) = testing::engine_with(
            MockStorage::new()
                .with_file("includes/a.html", r#"<include src="b.html"/>"#)
                .with_file("includes/b.html", "b"),
            config,
        );

        assert!(engine.expand_includes(r#"<include src="b.html"/>"#, None).is_ok());
        assert!(matches!(
            engine.expand_includes(r#"<include src="a.html"/>"#, None),
            Err(TemplateError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_reserved_placeholders_survive() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("includes/head.html", "<head>{tailwindcss}</head>"),
        );

        let out = engine
            .expand_includes(r#"<include src="head.html"/>"#, None)
            .unwrap();

        assert_eq!(out, "<head>{tailwindcss}</head>");
    }
}
