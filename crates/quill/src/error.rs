//! CLI error types.

use quill_config::ConfigError;
use quill_storage::StorageError;
use quill_template::TemplateError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{failed} of {total} documents failed to render")]
    Build { failed: usize, total: usize },

    #[error("{0}")]
    Validation(String),
}
