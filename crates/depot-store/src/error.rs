//! Store error type.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors returned by [`crate::ArtifactStore`] operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The path does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The destination exists and may not be overwritten.
    #[error("cannot overwrite release artifact: {}", .0.display())]
    Conflict(PathBuf),

    /// The inbound byte stream failed before it completed.
    #[error("upload interrupted: {0}")]
    Interrupted(String),

    /// Any other filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Classify an I/O error, normalizing not-found.
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
