//! Error types for session operations.

use thiserror::Error;

/// Errors raised by a durable storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be decoded.
    #[error("corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The backend cannot be reached at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while changing the signed-in identity.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The durable record could not be written or removed.
    #[error("persistence error: {0}")]
    Persistence(#[from] StorageError),

    /// A token must contain at least one character.
    #[error("token must not be empty")]
    EmptyToken,

    /// Another login or logout is still in flight.
    #[error("another sign-in operation is already in progress")]
    Busy,
}

/// Result type for storage backends.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
