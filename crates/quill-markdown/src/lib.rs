//! Markdown rendering for Quill content files.
//!
//! Converts Markdown to HTML with tables and GitHub-style heading anchors, and
//! extracts a table of contents whose slugs match those anchors.
//!
//! # Quick Start
//!
//! ```
//! use quill_markdown::{render, toc};
//!
//! let markdown = "# Title\n\n## Setup\n\nText.";
//! let html = render(markdown);
//! assert!(html.contains(r#"<h2 id="setup">Setup</h2>"#));
//!
//! let toc = toc(markdown);
//! assert_eq!(toc.entries.len(), 2);
//! assert_eq!(toc.markdown, "- [Title](#title)\n  - [Setup](#setup)");
//! ```

mod heading;
mod render;
mod slug;
mod toc;

pub use render::render;
pub use slug::slugify;
pub use toc::{Toc, TocEntry, toc};
