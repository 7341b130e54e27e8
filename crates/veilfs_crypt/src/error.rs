//! Error types for the crypt stream.

use crate::keys::FileId;
use thiserror::Error;
use veilfs_storage::StorageError;

/// Result type for crypt stream operations.
pub type CryptResult<T> = Result<T, CryptError>;

/// Errors that can occur in crypt stream operations.
#[derive(Debug, Error)]
pub enum CryptError {
    /// A parameter was out of range, or the underlying stream produced an
    /// impossible byte count.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the argument issue.
        message: String,
    },

    /// A block failed GCM authentication while verification is enabled.
    ///
    /// `offset` is the logical byte offset of the failing block, for
    /// diagnostics in layers that map streams back to paths.
    #[error("message verification failed for file {id} at offset {offset}")]
    MessageVerification {
        /// Identifier of the file whose block failed authentication.
        id: FileId,
        /// Logical plaintext offset of the failing block.
        offset: u64,
    },

    /// Structural corruption discovered by a higher layer.
    #[error("Stream is corrupted")]
    Corrupted,

    /// An error propagated from the underlying stream.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CryptError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
