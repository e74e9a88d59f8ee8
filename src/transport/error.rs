//! Error types for transport operations.

use thiserror::Error;

/// Error type for transport operations.
///
/// Describes what went wrong without dictating recovery strategy.
/// Retrying is left to the request queue.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and failures while reading the response body.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The transport completed but could not report a usable status code.
    #[error("status unavailable")]
    StatusUnavailable,
}
