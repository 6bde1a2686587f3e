//! Site directory layout, relative to the storage root.

use std::path::{Path, PathBuf};

pub(crate) const PAGES_DIR: &str = "pages";
pub(crate) const LAYOUTS_DIR: &str = "layouts";
pub(crate) const INCLUDES_DIR: &str = "includes";
pub(crate) const CONTENT_DIR: &str = "content";
pub(crate) const GLOBAL_DIR: &str = "content/global";
pub(crate) const COLLECTIONS_DIR: &str = "collections";
pub(crate) const MAIN_CSS: &str = "assets/css/main.css";

/// Page template used for every content file in a directory.
pub const CONTENT_TEMPLATE: &str = "[content].html";

/// Path of a persisted collection (`collections/<name>.json`).
pub(crate) fn collection_file(name: &str) -> PathBuf {
    Path::new(COLLECTIONS_DIR).join(format!("{name}.json"))
}

/// Path of a global data file (`content/global/<name>.md`).
pub(crate) fn global_file(name: &str) -> PathBuf {
    Path::new(GLOBAL_DIR).join(format!("{name}.md"))
}

/// Canonical route of a content file: `content/posts/hello.md` → `/posts/hello`.
pub(crate) fn content_link(path: &Path) -> String {
    let rel = path.strip_prefix(CONTENT_DIR).unwrap_or(path);
    let rel = rel.with_extension("");
    let segments: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    format!("/{}", segments.join("/"))
}
