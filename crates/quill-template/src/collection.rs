//! Content collections.
//!
//! A content directory is materialized into an ordered list of items, one per
//! file: the file's frontmatter plus `content` (body without frontmatter) and
//! `link` (canonical route). Materialized collections are kept in a
//! [`CollectionRegistry`] for the run and persisted under `collections/`.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::engine::Engine;
use crate::error::TemplateError;
use crate::paths;
use crate::{frontmatter, value};

/// In-memory collections materialized during one run.
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: HashMap<String, Vec<Value>>,
}

impl CollectionRegistry {
    /// Register (or replace) a collection.
    pub fn insert(&mut self, name: impl Into<String>, items: Vec<Value>) {
        self.collections.insert(name.into(), items);
    }

    /// Items of a collection by name (e.g. `content/posts`).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.collections.get(name).map(Vec::as_slice)
    }
}

/// Build collection items from the files directly inside `dir`.
///
/// Files are read in name order. When every item has `sort_key`, items are
/// sorted ascending by that value's string form; otherwise order is kept.
fn build_items(
    storage: &dyn quill_storage::Storage,
    dir: &Path,
    sort_key: &str,
) -> Result<Vec<Value>, TemplateError> {
    let mut items: Vec<Map<String, Value>> = Vec::new();

    for path in storage.list(dir)? {
        let raw = storage.read(&path)?;
        let doc = frontmatter::parse_lenient(&raw, &path);

        let mut item = doc.attributes;
        item.insert(
            "content".to_owned(),
            Value::String(doc.body.trim().to_owned()),
        );
        item.insert("link".to_owned(), Value::String(paths::content_link(&path)));
        items.push(item);
    }

    if !items.is_empty() && items.iter().all(|item| item.contains_key(sort_key)) {
        items.sort_by_cached_key(|item| item.get(sort_key).map(value::render).unwrap_or_default());
    }

    Ok(items.into_iter().map(Value::Object).collect())
}

impl Engine {
    /// Materialize `content/<name>` into the collection `content/<name>`.
    ///
    /// The collection is registered for this run and written as pretty JSON to
    /// `collections/content/<name>.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be read, or the
    /// artifact cannot be written.
    pub(crate) fn materialize(&mut self, name: &str) -> Result<(), TemplateError> {
        let collection = format!("{}/{name}", paths::CONTENT_DIR);
        let items = build_items(
            self.storage.as_ref(),
            Path::new(&collection),
            &self.config.sort_key,
        )?;

        let artifact = paths::collection_file(&collection);
        let json = serde_json::to_string_pretty(&items).map_err(|source| TemplateError::Json {
            path: artifact.clone(),
            source,
        })?;
        self.storage.write(&artifact, &json)?;

        tracing::debug!(collection = %collection, items = items.len(), "Materialized content collection");
        self.registry.insert(collection, items);
        Ok(())
    }
}
