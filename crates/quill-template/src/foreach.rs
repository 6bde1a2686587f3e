//! `<ForEach>` loop expansion.
//!
//! Loops run in two passes. The first materializes every `content="X"` source
//! and rewrites it to `collection="content/X"`. The second resolves each loop's
//! collection, applies `root`, `orderBy`, `offset` and `count`, and renders the
//! body once per item with the item bound to the loop alias.

use std::cmp::Ordering;
use std::convert::Infallible;

use serde_json::{Map, Value};

use crate::attrs::Attributes;
use crate::condition::process_conditions;
use crate::engine::Engine;
use crate::error::TemplateError;
use crate::frontmatter::Frontmatter;
use crate::{element, paths, placeholder, value};

const TAG: &str = "ForEach";

/// Sort direction of an `orderBy` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Asc,
    Desc,
}

/// Parse `field[,asc|desc]`.
fn parse_order_by(spec: &str) -> (&str, Direction) {
    match spec.split_once(',') {
        Some((field, dir)) if dir.trim().eq_ignore_ascii_case("desc") => {
            (field.trim(), Direction::Desc)
        }
        Some((field, _)) => (field.trim(), Direction::Asc),
        None => (spec.trim(), Direction::Asc),
    }
}

/// Case-insensitive comparison, then lowercase before uppercase.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Compare two items by one field: strings collate, numbers compare
/// numerically, anything else is equal.
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => collate(a, b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Stable sort of loop items by `field`.
fn sort_items(items: &mut [Value], field: &str, direction: Direction) {
    items.sort_by(|a, b| {
        let ordering = compare_field(a.get(field), b.get(field));
        match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
}

/// Walk a dotted path through objects and arrays.
fn navigate<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => items.get(key.parse::<usize>().ok()?),
        _ => None,
    })
}

/// Parse a non-negative integer attribute, ignoring invalid values.
fn number_attr(attrs: &Attributes, name: &str) -> Option<usize> {
    let raw = attrs.get(name)?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(attribute = name, value = raw, error = %e, "Ignoring invalid loop attribute");
            None
        }
    }
}

/// Opening tag text with the given attributes.
fn open_tag(name: &str, attrs: &[(String, String)]) -> String {
    let mut tag = format!("<{name}");
    for (key, value) in attrs {
        tag.push_str(&format!(" {key}=\"{}\"", value.replace('"', "&quot;")));
    }
    tag.push('>');
    tag
}

/// Marker standing in for the `index`-th nested loop while the outer body renders.
fn nested_marker(index: usize) -> String {
    format!("\u{0}{TAG}:{index}\u{0}")
}

/// Render one loop body for one item.
///
/// `<If>` blocks inside nested loops are left for the nested loop's own items.
fn render_item(body: &str, item: &Value, index: usize, alias: &str) -> String {
    let mut scope = match item {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    scope.insert("loop".to_owned(), Value::from(index + 1));

    let mut nested = Vec::new();
    let Ok(masked) = element::replace_each::<Infallible>(body, TAG, |el| {
        nested.push(&body[el.start..el.end]);
        Ok(Some(nested_marker(nested.len() - 1)))
    });

    let mut output = process_conditions(&masked, &scope, alias);
    for (i, block) in nested.iter().enumerate() {
        output = output.replacen(&nested_marker(i), block, 1);
    }
    if !item.is_object() {
        output = placeholder::replace_named(&output, alias, &value::render(item));
    }
    placeholder::replace_scoped(&output, alias, &scope)
}

impl Engine {
    /// Materialize content sources of loops and point the loops at them.
    ///
    /// # Errors
    ///
    /// Returns an error when a content directory cannot be read or its
    /// collection cannot be written.
    pub(crate) fn materialize_content_loops(&mut self, text: &str) -> Result<String, TemplateError> {
        element::replace_each(text, TAG, |el| {
            let Some(body) = el.body else {
                return Ok(None);
            };
            let body = self.materialize_content_loops(body)?;

            let Some(name) = el.attrs.get("content") else {
                let open = &text[el.start..el.open_end];
                let close = &text[el.open_end + el.body.map_or(0, str::len)..el.end];
                return Ok(Some(format!("{open}{body}{close}")));
            };

            self.materialize(name)?;

            let attrs: Vec<(String, String)> = el
                .attrs
                .iter()
                .filter(|(key, _)| *key != "content" && *key != "collection")
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .chain([(
                    "collection".to_owned(),
                    format!("{}/{name}", paths::CONTENT_DIR),
                )])
                .collect();
            let tag_name = &text[el.start + 1..el.start + 1 + TAG.len()];
            Ok(Some(format!("{}{body}</{tag_name}>", open_tag(tag_name, &attrs))))
        })
    }

    /// Expand every `<ForEach collection="...">` block.
    ///
    /// Loops nested in a body expand once per outer item, after the outer
    /// item's placeholders are filled. Blocks whose data cannot be resolved
    /// are removed. Blocks without a `collection` attribute are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error when a loop references a collection file that does
    /// not exist.
    pub(crate) fn expand_loops(
        &self,
        text: &str,
        frontmatter: Option<&Frontmatter>,
    ) -> Result<String, TemplateError> {
        element::replace_each(text, TAG, |el| {
            let Some(body) = el.body else {
                return Ok(None);
            };
            let Some(name) = el.attrs.get("collection") else {
                return Ok(None);
            };

            let Some(data) = self.loop_data(name, frontmatter)? else {
                return Ok(Some(String::new()));
            };

            let data = match el.attrs.get("root") {
                Some(root) => match navigate(&data, root) {
                    Some(inner) => inner.clone(),
                    None => {
                        tracing::warn!(collection = name, root, "Loop root path not found");
                        return Ok(Some(String::new()));
                    }
                },
                None => data,
            };
            let Value::Array(mut items) = data else {
                tracing::warn!(collection = name, "Loop collection is not an array");
                return Ok(Some(String::new()));
            };

            if let Some(order_by) = el.attrs.get("orderBy") {
                let (field, direction) = parse_order_by(order_by);
                sort_items(&mut items, field, direction);
            }

            let offset = number_attr(&el.attrs, "offset").unwrap_or(0);
            let count = number_attr(&el.attrs, "count").unwrap_or(usize::MAX);
            let alias = el
                .attrs
                .get("as")
                .map_or_else(|| name.replace('/', "."), str::to_owned);

            let output = items
                .iter()
                .skip(offset)
                .take(count)
                .enumerate()
                .map(|(index, item)| {
                    let rendered = render_item(body, item, index, &alias);
                    self.expand_loops(&rendered, frontmatter)
                })
                .collect::<Result<String, _>>()?;
            Ok(Some(output))
        })
    }

    /// Resolve the data behind a loop's `collection` attribute.
    ///
    /// `frontmatter.KEY` reads the document frontmatter; other names use the
    /// registry, then `collections/<name>.json`. `None` skips the loop.
    fn loop_data(
        &self,
        name: &str,
        frontmatter: Option<&Frontmatter>,
    ) -> Result<Option<Value>, TemplateError> {
        if let Some(key) = name.strip_prefix("frontmatter.") {
            let Some(fm) = frontmatter else {
                tracing::debug!(collection = name, "No frontmatter for loop, skipping");
                return Ok(None);
            };
            return Ok(match value::lookup(fm, key) {
                Some(data @ Value::Array(_)) => Some(data.clone()),
                Some(_) => {
                    tracing::warn!(collection = name, "Frontmatter loop source is not an array");
                    None
                }
                None => {
                    tracing::warn!(collection = name, "Frontmatter loop source not found");
                    None
                }
            });
        }

        if let Some(items) = self.registry.get(name) {
            return Ok(Some(Value::Array(items.to_vec())));
        }

        let path = paths::collection_file(name);
        let raw = self.storage.read(&path)?;
        match serde_json::from_str(&raw) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid collection JSON, skipping loop");
                Ok(None)
            }
        }
    }
}
