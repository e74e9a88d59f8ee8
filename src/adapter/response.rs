//! Transport-agnostic response shape.

use http::StatusCode;

use crate::request::Method;
use crate::transport::{BodyStream, HttpError, RawHeader};

/// A single response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name, as reported by the transport
    pub name: String,
    /// Header value
    pub value: String,
}

impl Header {
    /// Creates a header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Body of a normalized response: a declared length and an unread stream.
#[derive(Debug)]
pub struct ResponseBody {
    /// Declared content length, `None` when the transport did not know it
    pub content_length: Option<u64>,
    /// The unread body
    pub stream: BodyStream,
}

/// The result of one execution attempt.
///
/// Either carries a body (length plus lazy stream) or none at all;
/// bodyless outcomes (HEAD, 1xx, 204, 304) never expose a stream.
#[derive(Debug)]
pub struct NormalizedResponse {
    status: StatusCode,
    headers: Vec<Header>,
    body: Option<ResponseBody>,
}

impl NormalizedResponse {
    /// Creates a response with no body.
    #[must_use]
    pub const fn without_body(status: StatusCode, headers: Vec<Header>) -> Self {
        Self {
            status,
            headers,
            body: None,
        }
    }

    /// Creates a response with a body.
    #[must_use]
    pub const fn with_body(
        status: StatusCode,
        headers: Vec<Header>,
        content_length: Option<u64>,
        stream: BodyStream,
    ) -> Self {
        Self {
            status,
            headers,
            body: Some(ResponseBody {
                content_length,
                stream,
            }),
        }
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// All headers, in transport order, one entry per value.
    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Returns the first value of the named header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns true if the response carries a body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Declared content length; `None` without a body or when unknown.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.body.as_ref().and_then(|b| b.content_length)
    }

    /// Splits the response into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Vec<Header>, Option<ResponseBody>) {
        (self.status, self.headers, self.body)
    }

    /// Reads the whole body; a bodyless response yields an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if reading the stream fails.
    pub async fn bytes(self) -> Result<Vec<u8>, HttpError> {
        match self.body {
            Some(body) => body.stream.read_to_end().await,
            None => Ok(Vec::new()),
        }
    }
}

/// Returns true if a response to `method` with `status` carries a body.
///
/// Follows RFC 7230 section 3.3: responses to HEAD, informational (1xx)
/// responses, 204 No Content and 304 Not Modified have no body.
#[must_use]
pub fn has_response_body(method: Method, status: StatusCode) -> bool {
    method != Method::Head
        && !status.is_informational()
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::NOT_MODIFIED
}

/// Flattens transport headers into one entry per value.
///
/// Entries without a name (the status line some transports report as a
/// header) are dropped. Names and values pass through unchanged.
pub(super) fn convert_headers(raw: Vec<RawHeader>) -> Vec<Header> {
    raw.into_iter()
        .filter_map(|entry| match entry.name {
            Some(name) if !name.is_empty() => Some((name, entry.values)),
            _ => None,
        })
        .flat_map(|(name, values)| {
            values
                .into_iter()
                .map(move |value| Header::new(name.clone(), value))
        })
        .collect()
}
