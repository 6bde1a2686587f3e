//! Build-time template directives for the Quill site generator.
//!
//! Resolves the directive tags and placeholders of page and content documents
//! into final HTML:
//!
//! - `<page src>` and `<layout src ...>` composition with `{slot}`
//! - `<include src ...>` partials with attribute placeholders and slots
//! - `<ForEach>` loops over content directories, JSON collections and
//!   frontmatter arrays
//! - `<If condition>` blocks evaluated by a small expression language
//! - `{frontmatter.*}`, `{global.*}`, `{collections.*.json}`, `{dump(...)}`,
//!   `{tailwindcss}` and `{ url(...) }` placeholders
//!
//! Every file is resolved through a [`quill_storage::Storage`] rooted at the
//! site directory.
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//! use quill_storage::FsStorage;
//! use quill_template::{Engine, EngineConfig};
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("site")));
//! let mut engine = Engine::new(storage, EngineConfig::default());
//!
//! let index = engine.process_file(Path::new("pages/index.html"), None)?;
//! let post = engine.process_content(Path::new("content/posts/hello.md"))?;
//! ```

mod attrs;
mod collection;
mod condition;
mod content;
mod element;
mod engine;
mod error;
mod foreach;
pub mod frontmatter;
mod include;
mod layout;
mod paths;
mod placeholder;
mod resolve;
mod shortcode;
#[cfg(test)]
mod testing;
mod value;

pub use collection::CollectionRegistry;
pub use condition::{ConditionError, evaluate};
pub use engine::{Engine, EngineConfig, RELATIVE_URL};
pub use error::TemplateError;
pub use frontmatter::Frontmatter;
pub use paths::CONTENT_TEMPLATE;
