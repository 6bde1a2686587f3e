//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading site files from the local filesystem
//! and writing generated artifacts back to it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Every path is resolved against a root directory. Paths that try to leave
/// the root through `..` components are rejected.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use quill_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("site"));
/// let partial = storage.read(Path::new("includes/header.html"))?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory all paths are relative to.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Validate that a path doesn't escape the root directory.
    ///
    /// Rejects paths containing parent directory components (`..`) to prevent
    /// path traversal (e.g., `{dump('../../etc/passwd')}`).
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let has_parent_dir = path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));

        if has_parent_dir {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    /// Collect files below `dir_path` recursively into `files`.
    fn walk_directory(
        dir_path: &Path,
        rel_path: &Path,
        files: &mut Vec<PathBuf>,
    ) -> Result<(), StorageError> {
        let entries = fs::read_dir(dir_path).map_err(|e| {
            StorageError::io(e, Some(dir_path.to_path_buf())).with_backend(BACKEND)
        })?;

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }

            let child_rel = rel_path.join(&name);
            match entry.file_type() {
                Ok(t) if t.is_dir() => Self::walk_directory(&entry.path(), &child_rel, files)?,
                Ok(t) if t.is_file() => files.push(child_rel),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Failed to read file type");
                }
            }
        }

        Ok(())
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<String, StorageError> {
        Self::validate_path(path)?;
        let full_path = self.root.join(path);
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        Self::validate_path(path).is_ok() && self.root.join(path).exists()
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        Self::validate_path(dir)?;
        let full_path = self.root.join(dir);
        let entries = fs::read_dir(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .map(|e| dir.join(e.file_name()))
            .collect();
        files.sort();

        Ok(files)
    }

    fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        Self::validate_path(dir)?;
        let full_path = self.root.join(dir);
        if !full_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        Self::walk_directory(&full_path, dir, &mut files)?;
        files.sort();

        Ok(files)
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        Self::validate_path(path)?;
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::io(e, Some(parent.to_path_buf())).with_backend(BACKEND)
            })?;
        }
        fs::write(&full_path, content)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))
    }
}
