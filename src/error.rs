//! Error types for the bucketlib library.

use thiserror::Error;

/// Main error type for bucketlib operations.
#[derive(Error, Debug)]
pub enum BucketError {
    /// HTTP request failed with a status code and no structured payload.
    #[error("HTTP error! status: {0}")]
    HttpError(u16),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Backend answered with a structured `{error}` payload.
    #[error("{message}")]
    ServerError { status: u16, message: String },

    /// Backend reports that no storage provider is configured.
    #[error("Storage not configured")]
    NotConfigured,

    /// Transfer was cancelled by the caller.
    #[error("Transfer cancelled")]
    Cancelled,

    /// Invalid or unexpected response from server.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Custom error message.
    #[error("{0}")]
    Custom(String),
}

/// Coarse classification of a [`BucketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not complete.
    NetworkFailure,
    /// The backend answered with a non-success status.
    ServerError,
    /// User-initiated stop, not a failure.
    Cancelled,
    /// Backend has no storage configured.
    ConfigurationMissing,
    /// Local I/O, parsing or configuration problem.
    Local,
}

impl BucketError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BucketError::RequestError(_) => ErrorKind::NetworkFailure,
            BucketError::HttpError(_)
            | BucketError::ServerError { .. }
            | BucketError::InvalidResponse(_) => ErrorKind::ServerError,
            BucketError::Cancelled => ErrorKind::Cancelled,
            BucketError::NotConfigured => ErrorKind::ConfigurationMissing,
            BucketError::JsonError(_)
            | BucketError::Io(_)
            | BucketError::InvalidConfig(_)
            | BucketError::Custom(_) => ErrorKind::Local,
        }
    }

    /// Check whether this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BucketError::Cancelled)
    }
}

/// Result type alias for bucketlib operations.
pub type Result<T> = std::result::Result<T, BucketError>;
