//! YAML frontmatter parsing.
//!
//! A document may start with a `---` delimited YAML header. The header is
//! parsed with `serde_yaml` straight into `serde_json` values so every later
//! stage works on one value model.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Frontmatter mapping of a document.
pub type Frontmatter = Map<String, Value>;

static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)").unwrap()
});

/// Document split into frontmatter and body.
#[derive(Debug, PartialEq)]
pub struct Document<'a> {
    /// Parsed header (empty when absent or not a mapping).
    pub attributes: Frontmatter,
    /// Text after the header, untrimmed.
    pub body: &'a str,
}

/// Split raw text into the YAML header (if any) and the body.
#[must_use]
pub fn split(text: &str) -> (Option<&str>, &str) {
    match FRONTMATTER_RE.captures(text) {
        Some(caps) => {
            let yaml = caps.get(1).map_or("", |m| m.as_str());
            let end = caps.get(0).map_or(0, |m| m.end());
            (Some(yaml), &text[end..])
        }
        None => (None, text),
    }
}

/// Parse a document's frontmatter.
///
/// Headers that are empty or not a YAML mapping yield an empty mapping.
///
/// # Errors
///
/// Returns the YAML error when the header is malformed.
pub fn parse(text: &str) -> Result<Document<'_>, serde_yaml::Error> {
    let (yaml, body) = split(text);
    let attributes = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => match serde_yaml::from_str::<Value>(yaml)? {
            Value::Object(map) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    };
    Ok(Document { attributes, body })
}

/// Parse frontmatter, logging malformed headers and treating them as empty.
pub(crate) fn parse_lenient<'a>(text: &'a str, path: &Path) -> Document<'a> {
    parse(text).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Invalid frontmatter, ignoring it");
        Document {
            attributes: Map::new(),
            body: split(text).1,
        }
    })
}

/// Remove the frontmatter header and trim the remaining body.
#[must_use]
pub fn strip(text: &str) -> &str {
    split(text).1.trim()
}
