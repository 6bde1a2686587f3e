//! Document-level data placeholders: `{dump(...)}`, `{collections.*.json}`
//! and `{global.*}`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::engine::Engine;
use crate::error::TemplateError;
use crate::paths;
use crate::placeholder::{self, fallback_capture};
use crate::{frontmatter, value};

static DUMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{dump\(['"]([^'"]+)['"]\)\}"#).unwrap());

static COLLECTION_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{collections\.([^}]+)\.json\}").unwrap());

static GLOBAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{global\.([^.}|\s]+)(?:\.([^}|\s]+))?(?:\s+or\s+([^}]+))?\}").unwrap()
});

/// Escape text for safe insertion into HTML.
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#039;"),
            _ => result.push(c),
        }
    }
    result
}

impl Engine {
    /// Replace `{dump('path')}` with the HTML-escaped content of a site file.
    ///
    /// Missing or unreadable files resolve to an empty string.
    pub(crate) fn resolve_dumps(&self, text: &str) -> String {
        placeholder::replace_with(text, &DUMP_RE, |caps| {
            let path = Path::new(&caps[1]);
            match self.storage.read(path) {
                Ok(content) => Some(escape_html(&content)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Dump file not readable");
                    Some(String::new())
                }
            }
        })
    }

    /// Replace `{collections.NAME.json}` with the compact JSON of a collection.
    ///
    /// Collections materialized in this run win over `collections/NAME.json`.
    ///
    /// # Errors
    ///
    /// Returns an error when the collection file is missing or not valid JSON.
    pub(crate) fn resolve_collection_json(&self, text: &str) -> Result<String, TemplateError> {
        let mut output = String::with_capacity(text.len());
        let mut last = 0;

        for caps in COLLECTION_JSON_RE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let name = &caps[1];

            let json = match self.registry.get(name) {
                Some(items) => Value::Array(items.to_vec()).to_string(),
                None => {
                    let path = paths::collection_file(name);
                    let raw = self.storage.read(&path)?;
                    let data: Value = serde_json::from_str(&raw)
                        .map_err(|source| TemplateError::Json { path, source })?;
                    data.to_string()
                }
            };

            output.push_str(&text[last..whole.start()]);
            output.push_str(&json);
            last = whole.end();
        }

        output.push_str(&text[last..]);
        Ok(output)
    }

    /// Replace `{global.FILE}` and `{global.FILE.ATTR}` with global data.
    ///
    /// Data comes from `content/global/FILE.md`: the body without frontmatter,
    /// or one frontmatter value. A missing file or an absent, `null` or empty
    /// value resolves to the fallback, or an empty string without one.
    pub(crate) fn resolve_globals(&self, text: &str) -> String {
        if !text.contains("{global.") {
            return text.to_owned();
        }

        placeholder::replace_with(text, &GLOBAL_RE, |caps| {
            let path = paths::global_file(&caps[1]);
            let resolved = match self.storage.read(&path) {
                Ok(raw) => match caps.get(2) {
                    Some(attr) => {
                        let doc = frontmatter::parse_lenient(&raw, &path);
                        value::lookup(&doc.attributes, attr.as_str())
                            .filter(|v| !is_blank(v))
                            .map(value::render)
                    }
                    None => Some(frontmatter::strip(&raw).to_owned()),
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Global file not found");
                    None
                }
            };
            Some(resolved.or_else(|| fallback_capture(caps, 3)).unwrap_or_default())
        })
    }
}

/// Values treated as absent for global attributes.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
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
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_dump() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("snippets/code.html", "<b>bold</b>"),
        );

        assert_eq!(
            engine.resolve_dumps(r#"<pre>{dump('snippets/code.html')}</pre>"#),
            "<pre>&lt;b&gt;bold&lt;/b&gt;</pre>"
        );
    }

    #[test]
    fn test_dump_missing_file() {
        let (engine, _) = testing::engine(MockStorage::new());

        assert_eq!(engine.resolve_dumps(r#"a{dump("nope.txt")}b"#), "ab");
    }

    #[test]
    fn test_collection_json_from_file() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("collections/menu.json", "[\n  {\"name\": \"Home\"}\n]"),
        );

        let out = engine
            .resolve_collection_json("<script>const m = {collections.menu.json};</script>")
            .unwrap();

        assert_eq!(out, r#"<script>const m = [{"name":"Home"}];</script>"#);
    }

    #[test]
    fn test_collection_json_prefers_registry() {
        let (mut engine, _) = testing::engine(MockStorage::new());
        engine
            .registry
            .insert("content/posts", vec![json!({"title": "A"})]);

        let out = engine
            .resolve_collection_json("{collections.content/posts.json}")
            .unwrap();

        assert_eq!(out, r#"[{"title":"A"}]"#);
    }

    #[test]
    fn test_collection_json_missing_is_fatal() {
        let (engine, _) = testing::engine(MockStorage::new());

        let err = engine
            .resolve_collection_json("{collections.missing.json}")
            .unwrap_err();

        assert!(matches!(err, TemplateError::Storage(_)));
    }

    #[test]
    fn test_collection_json_invalid_is_fatal() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("collections/bad.json", "[oops"),
        );

        let err = engine.resolve_collection_json("{collections.bad.json}").unwrap_err();

        assert!(matches!(err, TemplateError::Json { .. }));
    }

    #[test]
    fn test_global_body_and_attributes() {
        let (engine, _) = testing::engine(MockStorage::new().with_file(
            "content/global/settings.md",
            "---\ntitle: My Site\nsocial:\n  - twitter\n  - github\nempty: ''\n---\n\nFooter text\n",
        ));

        assert_eq!(engine.resolve_globals("{global.settings}"), "Footer text");
        assert_eq!(engine.resolve_globals("{global.settings.title}"), "My Site");
        assert_eq!(
            engine.resolve_globals("{global.settings.social}"),
            "twitter|github"
        );
        assert_eq!(
            engine.resolve_globals("{global.settings.empty or 'Fallback'}"),
            "Fallback"
        );
        assert_eq!(engine.resolve_globals("{global.settings.missing}"), "");
    }

    #[test]
    fn test_global_missing_file_uses_fallback() {
        let (engine, _) = testing::engine(MockStorage::new());

        assert_eq!(
            engine.resolve_globals("{global.settings.title or 'Untitled'}"),
            "Untitled"
        );
        assert_eq!(engine.resolve_globals("[{global.settings.title}]"), "[]");
        assert_eq!(engine.resolve_globals("[{global.nav or null}]"), "[]");
    }

    #[test]
    fn test_resolve_value_combines_frontmatter_and_globals() {
        let (engine, _) = testing::engine(
            MockStorage::new().with_file("content/global/site.md", "---\nname: Quill\n---\n"),
        );
        let fm = json!({"title": "Post"});

        assert_eq!(
            engine.resolve_value("{frontmatter.title} | {global.site.name}", fm.as_object()),
            "Post | Quill"
        );
    }
}
