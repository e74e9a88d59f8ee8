//! Error types raised while building or parsing requests.

use thiserror::Error;

/// Credential failure reported while producing request headers or params.
///
/// The adapter propagates this unchanged; it never retries or downgrades
/// an authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authentication failed: {reason}")]
pub struct AuthError {
    /// What the credential provider reported
    pub reason: String,
}

impl AuthError {
    /// Creates an authentication error with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure to turn a request body into bytes.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The JSON body could not be serialized.
    #[error("failed to serialize JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to turn response bytes into a typed result.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The response body is not valid JSON.
    #[error("failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),
}
