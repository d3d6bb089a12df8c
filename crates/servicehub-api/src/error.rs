//! # API Errors
//!
//! Error types for API operations.

use thiserror::Error;

/// Errors that can occur during API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network or HTTP transport error, including timeouts.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend returned a non-success response.
    #[error("server error: {status} - {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the backend.
        message: String,
    },

    /// Failed to deserialize response, or it was missing required data.
    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    /// The client could not be constructed.
    #[error("client configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of a server error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
