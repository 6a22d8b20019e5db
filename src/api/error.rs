//! Backend error payloads.

use serde::Deserialize;

use crate::error::BucketError;

/// Structured error body returned by the backend on failure.
///
/// The backend answers failures with `{"error": "...", "details": "..."}`.
/// Unconfigured storage is reported through `message` instead.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    /// Short error text
    #[serde(default)]
    pub error: Option<String>,
    /// Optional longer explanation
    #[serde(default)]
    pub details: Option<String>,
    /// Informational message (used for the not-configured state)
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorPayload {
    /// Check whether the payload announces missing storage configuration.
    pub fn is_not_configured(&self) -> bool {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .any(is_not_configured_message)
    }

    /// Human readable reason, preferring `error` and appending `details`.
    pub fn reason(&self) -> Option<String> {
        let error = self.error.as_deref()?;
        Some(match self.details.as_deref() {
            Some(details) if !details.is_empty() => format!("{}: {}", error, details),
            _ => error.to_string(),
        })
    }
}

/// Check whether a backend message reports missing storage configuration.
///
/// Both "S3 not configured" and "Storage not configured" are in use.
pub fn is_not_configured_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("not configured")
}

/// Convert a failed response body into a [`BucketError`].
///
/// Falls back to [`BucketError::HttpError`] when the body carries no
/// structured `error` field.
pub fn error_from_body(status: u16, body: &str) -> BucketError {
    let payload: ErrorPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(_) => return BucketError::HttpError(status),
    };

    if payload.is_not_configured() {
        return BucketError::NotConfigured;
    }

    match payload.reason() {
        Some(message) => BucketError::ServerError { status, message },
        None => BucketError::HttpError(status),
    }
}
