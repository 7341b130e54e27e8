//! Error types for underlying stream operations.

use std::io;
use thiserror::Error;

/// Result type for underlying stream operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while operating on an underlying stream.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The underlying stream is structurally corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),
}
