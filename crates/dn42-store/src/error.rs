//! Error types for router peer files.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or writing router files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file or directory could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML, or peers could not be serialized.
    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        /// Path of the router file.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The document is not a list of peers.
    #[error("{}: expected a list of peers", path.display())]
    NotASequence {
        /// Path of the router file.
        path: PathBuf,
    },

    /// A list item is not a mapping.
    #[error("{}: peer #{index} is not a mapping", path.display())]
    NotAMapping {
        /// Path of the router file.
        path: PathBuf,
        /// Zero-based position of the item.
        index: usize,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn yaml(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }
}
