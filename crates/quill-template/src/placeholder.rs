//! Brace placeholder grammar.
//!
//! Placeholders take the form `{name}` or `{name or fallback}`. Each dialect
//! (bare names, `frontmatter.*`, loop aliases) has its own pattern; a pattern
//! never consumes a placeholder that belongs to another dialect.

use std::sync::LazyLock;

use regex::{Captures, NoExpand, Regex};
use serde_json::{Map, Value};

use crate::value;

/// Names the bare sweep leaves for later stages.
const RESERVED: [&str; 4] = ["slot", "content", "tailwindcss", "static_content_element"];

static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}.|\s(]+)(?:\s+or\s+([^}]+))?\}").unwrap());

static FRONTMATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{frontmatter\.([^}|\s]+)(?:\s+or\s+([^}]+))?\}").unwrap());

/// Resolve the text of an `or` clause.
///
/// `null` yields an empty string, a quoted literal its unquoted content, and
/// anything else the trimmed text.
#[must_use]
pub fn fallback(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "null" {
        return String::new();
    }
    let quoted = trimmed.len() >= 2
        && trimmed.starts_with(['\'', '"'])
        && trimmed.ends_with(['\'', '"']);
    if quoted {
        return trimmed[1..trimmed.len() - 1].to_owned();
    }
    trimmed.to_owned()
}

/// Replace placeholders matched by `re`.
///
/// `resolve` receives the captures and returns the replacement, or `None` to
/// leave the placeholder untouched.
pub(crate) fn replace_with(
    text: &str,
    re: &Regex,
    mut resolve: impl FnMut(&Captures<'_>) -> Option<String>,
) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        resolve(caps).unwrap_or_else(|| caps[0].to_owned())
    })
    .into_owned()
}

/// Resolve a placeholder whose value is missing: apply the fallback if present.
pub(crate) fn fallback_capture(caps: &Captures<'_>, group: usize) -> Option<String> {
    caps.get(group).map(|m| fallback(m.as_str()))
}

/// Replace every `{name}` and `{name or ...}` with `value`.
///
/// The value is inserted literally.
#[must_use]
pub fn replace_named(text: &str, name: &str, value: &str) -> String {
    if !text.contains(&format!("{{{name}")) {
        return text.to_owned();
    }
    let pattern = format!(r"\{{{}(?:\s+or\s+[^}}]+)?\}}", regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, NoExpand(value)).into_owned(),
        Err(e) => {
            tracing::warn!(name, error = %e, "Invalid placeholder name");
            text.to_owned()
        }
    }
}

/// Sweep remaining bare `{name or fallback}` placeholders.
///
/// Names containing a dot, whitespace or `(` and the reserved names are left
/// alone, as are placeholders without a fallback.
#[must_use]
pub fn sweep_bare(text: &str) -> String {
    replace_with(text, &BARE_RE, |caps| {
        if RESERVED.contains(&&caps[1]) {
            return None;
        }
        fallback_capture(caps, 2)
    })
}

/// Substitute `{frontmatter.key}` placeholders.
///
/// Dotted keys look up nested values. Missing keys use the fallback when one
/// is given and are left untouched otherwise.
#[must_use]
pub fn replace_frontmatter(text: &str, frontmatter: &Map<String, Value>) -> String {
    replace_with(text, &FRONTMATTER_RE, |caps| {
        match value::lookup(frontmatter, &caps[1]) {
            Some(v) => Some(value::render(v)),
            None => fallback_capture(caps, 2),
        }
    })
}

/// Substitute `{alias.path}` placeholders against a loop scope.
///
/// Resolved paths render their value; unresolved ones use the fallback or
/// stay untouched.
pub(crate) fn replace_scoped(text: &str, alias: &str, scope: &Map<String, Value>) -> String {
    if !text.contains(&format!("{{{alias}.")) {
        return text.to_owned();
    }
    let pattern = format!(
        r"\{{{}\.([^}}|\s]+)(?:\s+or\s+([^}}]+))?\}}",
        regex::escape(alias)
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(alias, error = %e, "Invalid loop alias");
            return text.to_owned();
        }
    };
    replace_with(text, &re, |caps| match value::lookup(scope, &caps[1]) {
        Some(v) => Some(value::render(v)),
        None => fallback_capture(caps, 2),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_fallback_forms() {
        assert_eq!(fallback("null"), "");
        assert_eq!(fallback(" 'Untitled' "), "Untitled");
        assert_eq!(fallback("\"Quoted\""), "Quoted");
        assert_eq!(fallback("  bare words "), "bare words");
        assert_eq!(fallback("'"), "'");
    }

    #[test]
    fn test_replace_named() {
        let text = "<h1>{title}</h1><p>{title or 'x'}</p>{titles}";
        assert_eq!(
            replace_named(text, "title", "Hi"),
            "<h1>Hi</h1><p>Hi</p>{titles}"
        );
    }

    #[test]
    fn test_replace_named_inserts_literally() {
        assert_eq!(replace_named("{price}", "price", "$1.00"), "$1.00");
    }

    #[test]
    fn test_replace_named_escapes_name() {
        assert_eq!(replace_named("{a.b} {axb}", "a.b", "v"), "v {axb}");
    }

    #[test]
    fn test_sweep_bare_applies_fallbacks() {
        assert_eq!(
            sweep_bare("{title or 'Untitled'}|{sub or null}|{plain}"),
            "Untitled||{plain}"
        );
    }

    #[test]
    fn test_sweep_bare_skips_other_dialects() {
        let text = "{slot} {content or 'x'} {tailwindcss} {static_content_element} \
                    {frontmatter.title or 'x'} {dump('a.txt')} { url('/a') }";
        assert_eq!(sweep_bare(text), text);
    }

    #[test]
    fn test_replace_frontmatter() {
        let fm = json!({"title": "Post", "author": {"name": "Ann"}, "tags": ["a", "b"]});
        let fm = fm.as_object().unwrap();

        assert_eq!(
            replace_frontmatter(
                "{frontmatter.title} by {frontmatter.author.name} [{frontmatter.tags}]",
                fm
            ),
            "Post by Ann [a|b]"
        );
    }

    #[test]
    fn test_replace_frontmatter_missing_key() {
        let fm = Map::new();

        assert_eq!(
            replace_frontmatter("{frontmatter.sub or 'None'}{frontmatter.x}", &fm),
            "None{frontmatter.x}"
        );
    }

    #[test]
    fn test_replace_scoped() {
        let scope = json!({"title": "A", "meta": {"n": 2}, "loop": 1});
        let scope = scope.as_object().unwrap();

        assert_eq!(
            replace_scoped(
                "{post.title} {post.meta.n} #{post.loop} {post.x or 'd'} {post.y} {other.title}",
                "post",
                scope
            ),
            "A 2 #1 d {post.y} {other.title}"
        );
    }
}
