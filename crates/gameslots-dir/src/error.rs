//! Error types for directory-backed storage

use std::path::PathBuf;

use thiserror::Error;

/// Errors opening a directory store
#[derive(Debug, Error)]
pub enum DirStoreError {
    /// The bank root path does not exist
    #[error("Bank root {} does not exist", path.display())]
    RootNotFound {
        /// Configured root path
        path: PathBuf,
    },

    /// The bank root path exists but is not a directory
    #[error("Bank root {} is not a directory", path.display())]
    NotADirectory {
        /// Configured root path
        path: PathBuf,
    },

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for directory store operations
pub type Result<T> = std::result::Result<T, DirStoreError>;
