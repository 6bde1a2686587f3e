//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Storage, StorageError};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores files in memory keyed by root-relative path. Directories exist
/// implicitly as prefixes of stored files. Use the builder methods to
/// configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use quill_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("layouts/main.html", "<body>{slot}</body>")
///     .with_file("pages/index.html", "<layout src=\"main.html\">Hi</layout>");
///
/// let content = storage.read(Path::new("layouts/main.html")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Current content of a file, including files written through [`Storage::write`].
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().unwrap().get(path.as_ref()).cloned()
    }
}

impl Storage for MockStorage {
    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap()
            .keys()
            .any(|p| p.starts_with(path))
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let files = self.files.read().unwrap();
        let mut is_dir = false;
        let mut listed = Vec::new();
        for path in files.keys() {
            if path != dir && path.starts_with(dir) {
                is_dir = true;
                if path.parent() == Some(dir) {
                    listed.push(path.clone());
                }
            }
        }

        if !is_dir {
            return Err(StorageError::not_found(dir).with_backend(BACKEND));
        }
        Ok(listed)
    }

    fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let files = self.files.read().unwrap();
        Ok(files
            .keys()
            .filter(|p| *p != dir && p.starts_with(dir))
            .filter(|p| {
                p.strip_prefix(dir).is_ok_and(|rel| {
                    !rel.components()
                        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
                })
            })
            .cloned()
            .collect())
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), content.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_mock_storage_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockStorage>();
    }

    #[test]
    fn test_read() {
        let storage = MockStorage::new().with_file("includes/card.html", "<div>{slot}</div>");

        assert_eq!(
            storage.read(Path::new("includes/card.html")).unwrap(),
            "<div>{slot}</div>"
        );
    }

    #[test]
    fn test_read_missing() {
        let storage = MockStorage::new();
        let err = storage.read(Path::new("includes/card.html")).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.backend, Some("Mock"));
    }

    #[test]
    fn test_exists_file_and_dir() {
        let storage = MockStorage::new().with_file("pages/blog/index.html", "");

        assert!(storage.exists(Path::new("pages/blog/index.html")));
        assert!(storage.exists(Path::new("pages/blog")));
        assert!(storage.exists(Path::new("pages")));
        assert!(!storage.exists(Path::new("pages/about.html")));
    }

    #[test]
    fn test_list_direct_children_only() {
        let storage = MockStorage::new()
            .with_file("content/posts/b.md", "")
            .with_file("content/posts/a.md", "")
            .with_file("content/posts/drafts/c.md", "")
            .with_file("content/pages.md", "");

        let files = storage.list(Path::new("content/posts")).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("content/posts/a.md"),
                PathBuf::from("content/posts/b.md"),
            ]
        );
    }

    #[test]
    fn test_list_missing_dir() {
        let storage = MockStorage::new();

        assert!(storage.list(Path::new("content/posts")).is_err());
    }

    #[test]
    fn test_walk_skips_hidden() {
        let storage = MockStorage::new()
            .with_file("pages/index.html", "")
            .with_file("pages/blog/index.html", "")
            .with_file("pages/.draft.html", "")
            .with_file("layouts/main.html", "");

        let files = storage.walk(Path::new("pages")).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("pages/blog/index.html"),
                PathBuf::from("pages/index.html"),
            ]
        );
    }

    #[test]
    fn test_write_then_read() {
        let storage = MockStorage::new();
        storage
            .write(Path::new("collections/content/posts.json"), "[]")
            .unwrap();

        assert_eq!(
            storage.content("collections/content/posts.json").as_deref(),
            Some("[]")
        );
    }
}
