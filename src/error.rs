//! Error taxonomy for the indexing core.
//!
//! Per-file problems during a catalog build are logged and converted into
//! absence in the resulting data (an omitted artifact, a query entry without
//! a variable manifest). These error types cross a component boundary only
//! where the caller genuinely has to react: an unusable workspace root, or a
//! watcher that could not be established.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    /// A file's content could not be parsed at all (GraphQL), or yielded no
    /// usable mapping root (YAML).
    #[error("could not parse {path}: {message}")]
    DocumentSyntax { path: PathBuf, message: String },

    /// A referenced file (manifest, or a query's `file_path`) does not exist.
    #[error("referenced file does not exist: {path}")]
    MissingFile { path: PathBuf },

    /// The environment cannot establish a file watch. Fatal to
    /// change-reactivity only; explicit catalog builds keep working.
    #[error("could not establish file watch: {0}")]
    WatcherSetup(#[from] notify::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IndexError {
    pub(crate) fn syntax(path: &std::path::Path, message: impl ToString) -> Self {
        IndexError::DocumentSyntax {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
