//! Error types for request adaptation.

use thiserror::Error;

use crate::request::{AuthError, EncodingError, Method};
use crate::transport::HttpError;

/// Error type for [`RequestAdapter::execute`](super::RequestAdapter::execute).
///
/// Every variant carries enough context (method, URL, header name) to
/// diagnose the failure without replaying the request.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The transport could not complete the call.
    #[error("{method} {url} failed: {source}")]
    Transport {
        /// Method of the failed request
        method: Method,
        /// Resolved URL of the failed request
        url: String,
        /// Underlying transport error
        #[source]
        source: HttpError,
    },

    /// The request method cannot be sent by the adapter.
    #[error("Unsupported request method: {0}")]
    InvalidMethod(Method),

    /// Header or param construction reported a credential failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request body could not be encoded.
    #[error("Failed to encode body for {url}: {source}")]
    Encoding {
        /// URL of the request whose body failed
        url: String,
        /// Underlying encoding error
        #[source]
        source: EncodingError,
    },

    /// A header name or value cannot be sent on the wire.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader {
        /// The offending header name
        name: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Extension trait for checking if an error is retryable.
///
/// The adapter never retries; the request queue uses this to decide
/// whether another attempt is worthwhile.
pub trait IsRetryable {
    /// Returns true if the error is potentially transient and should be retried.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            // Network errors are typically transient
            Self::Connection(_) | Self::Timeout => true,
            // Bad URLs and unreadable status lines will not improve on retry
            Self::InvalidUrl(_) | Self::StatusUnavailable => false,
        }
    }
}

impl IsRetryable for AdapterError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_retryable(),
            Self::InvalidMethod(_)
            | Self::Auth(_)
            | Self::Encoding { .. }
            | Self::InvalidHeader { .. } => false,
        }
    }
}
