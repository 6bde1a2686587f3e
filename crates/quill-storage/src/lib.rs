//! Storage abstraction for the Quill site generator.
//!
//! This crate provides a [`Storage`] trait so the template engine resolves every
//! file through an explicit site root instead of the process working directory.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()`, `exists()`, `list()`, `walk()` and `write()`
//! - [`FsStorage`] implementation rooted at a directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use quill_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("site"));
//! let layout = storage.read(Path::new("layouts/main.html"))?;
//! for page in storage.walk(Path::new("pages"))? {
//!     println!("{}", page.display());
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
