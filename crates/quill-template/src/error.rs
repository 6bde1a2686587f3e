use std::path::PathBuf;

use quill_storage::StorageError;

/// Error that aborts processing of the current document.
///
/// Recoverable problems (missing global file, malformed condition, missing
/// dump file) are logged and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// `<layout>` block without a `src` attribute.
    #[error("Layout tag must include a src attribute: {}", .path.display())]
    MissingLayoutSrc {
        /// Document containing the layout block.
        path: PathBuf,
    },
    /// A layout, partial, page template or collection could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// The rendered document's frontmatter is not valid YAML.
    #[error("Invalid frontmatter in {}: {message}", .path.display())]
    Frontmatter {
        /// Document with the invalid header.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// Include nesting exceeded the configured maximum.
    #[error("Include depth limit of {max_depth} exceeded while expanding '{src}' (cyclic include?)")]
    DepthExceeded {
        /// Partial being expanded when the limit was hit.
        src: String,
        /// Configured limit.
        max_depth: usize,
    },
    /// No page template matches a content file.
    #[error("No page template found for content file: {}", .0.display())]
    PageNotFound(PathBuf),
    /// JSON collection could not be parsed or serialized.
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        /// Collection file or document involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}
