//! Abstract requests and the canned request family.
//!
//! This module provides:
//! - The [`Request`] trait consumed by the adapter
//! - Request methods ([`Method`]) and ordered parameters ([`Params`])
//! - Retry bookkeeping ([`RetryPolicy`], [`DefaultRetryPolicy`])
//! - Canned requests with fixed body rules ([`StringRequest`], [`JsonRequest`],
//!   [`FormRequest`]) built through [`CannedRequestBuilder`]

mod body;
mod canned;
mod error;
mod method;
mod params;
mod retry;


use std::collections::HashMap;

pub use body::{FormBody, JsonBody, RequestBody, TextBody, parse_charset};
pub use canned::{
    CannedRequest, CannedRequestBuilder, ErrorListener, FormRequest, JsonRequest, Listener,
    StringRequest, concatenated_cache_key,
};
pub use error::{AuthError, EncodingError, ParseError};
pub use method::{Method, UnknownMethod};
pub use params::Params;
pub use retry::{DefaultRetryPolicy, RetryError, RetryPolicy, RetrySettings};

/// Content type assumed for bodies of requests that do not declare one.
pub const DEFAULT_BODY_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// An abstract HTTP request as seen by the adapter.
///
/// Implementations describe *what* to send; the adapter decides how it is
/// encoded on the wire. Header and param accessors may consult credential
/// providers and therefore can fail with [`AuthError`].
pub trait Request: Send + Sync {
    /// The request method.
    fn method(&self) -> Method;

    /// The request URL, before any query parameters are appended.
    fn url(&self) -> &str;

    /// Headers owned by the request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if credentials needed for a header are missing.
    fn headers(&self) -> Result<HashMap<String, String>, AuthError> {
        Ok(HashMap::new())
    }

    /// Parameters sent as a query string for query-carrying methods.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if credentials needed for a parameter are missing.
    fn params(&self) -> Result<Params, AuthError> {
        Ok(Params::new())
    }

    /// Encoded body bytes, or `None` if the request has no body.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if the body cannot be serialized.
    fn body(&self) -> Result<Option<Vec<u8>>, EncodingError> {
        Ok(None)
    }

    /// Declared content type of the body.
    fn body_content_type(&self) -> &str {
        DEFAULT_BODY_CONTENT_TYPE
    }

    /// Retry bookkeeping for this request.
    fn retry_policy(&self) -> &dyn RetryPolicy;

    /// Key under which the response may be cached.
    fn cache_key(&self) -> String {
        self.url().to_string()
    }
}
