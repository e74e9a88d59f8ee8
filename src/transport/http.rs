//! HTTP request/response types and client trait.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use tokio_stream::{Stream, StreamExt};

use super::HttpError;

/// An HTTP request to be sent.
///
/// This is the wire-level shape the adapter hands to an [`HttpClient`].
/// It uses standard `http` crate types for method and headers, ensuring
/// compatibility with the broader ecosystem.
///
/// `body` distinguishes "no body" (`None`) from an explicit empty body
/// (`Some(vec![])`), which some transports require for POST-like verbs.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: http::Method,
    /// Target URL
    pub url: url::Url,
    /// HTTP headers to send
    pub headers: http::HeaderMap,
    /// Optional request body
    pub body: Option<Vec<u8>>,
    /// Per-attempt timeout, if the caller wants one
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a new HTTP request with the given method and URL.
    ///
    /// Headers are initialized to an empty map, body and timeout are `None`.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Creates a GET request to the given URL.
    #[must_use]
    pub fn get(url: url::Url) -> Self {
        Self::new(http::Method::GET, url)
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header to the request, appending if the name already exists.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// One header entry as reported by a transport.
///
/// Some transports report the status line as a header with no name;
/// `name` is `None` for such entries. Multi-valued headers carry every
/// value in `values`, in the order the transport reported them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    /// Header name, absent for synthetic entries
    pub name: Option<String>,
    /// All values reported under this name
    pub values: Vec<String>,
}

impl RawHeader {
    /// Creates a named header entry.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: Some(name.into()),
            values,
        }
    }

    /// Creates a nameless entry, as injected by transports for the status line.
    #[must_use]
    pub const fn unnamed(values: Vec<String>) -> Self {
        Self { name: None, values }
    }
}

/// A response as reported by the transport, before normalization.
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw status code, `None` when the transport could not retrieve one
    pub status: Option<u16>,
    /// Header entries in transport order
    pub headers: Vec<RawHeader>,
    /// Declared content length, if known
    pub content_length: Option<u64>,
    /// Body stream, if the transport opened one
    pub body: Option<BodyStream>,
}

impl TransportResponse {
    /// Creates a response with the given status and no headers or body.
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self {
            status: Some(status),
            headers: Vec::new(),
            content_length: None,
            body: None,
        }
    }

    /// Adds a header entry.
    #[must_use]
    pub fn with_header(mut self, header: RawHeader) -> Self {
        self.headers.push(header);
        self
    }

    /// Sets a fully buffered body, also recording its length.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.content_length = Some(body.len() as u64);
        self.body = Some(BodyStream::from_bytes(body));
        self
    }
}

type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// A lazily read response body.
///
/// Nothing is pulled from the network until the stream is polled.
/// Dropping the stream discards the unread remainder.
pub struct BodyStream {
    inner: ChunkStream,
}

impl BodyStream {
    /// Wraps any chunk stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, HttpError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A stream that yields nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(tokio_stream::empty())
    }

    /// A stream that yields the given bytes as a single chunk.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(tokio_stream::once(Ok(bytes.into())))
    }

    /// Returns the next chunk, or `None` once the body is exhausted.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes, HttpError>> {
        self.inner.next().await
    }

    /// Reads the remaining body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first error reported while reading a chunk.
    pub async fn read_to_end(mut self) -> Result<Vec<u8>, HttpError> {
        let mut buffer = Vec::new();
        while let Some(chunk) = self.next_chunk().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer)
    }
}

impl Stream for BodyStream {
    type Item = Result<Bytes, HttpError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream").finish_non_exhaustive()
    }
}

/// Trait for executing HTTP requests.
///
/// # Design
///
/// This trait abstracts the HTTP client implementation, enabling:
/// - Dependency injection for testing with mock clients
/// - Swapping HTTP libraries without changing the adapter
///
/// Implementations must be safe for concurrent calls; the adapter shares
/// a single client across every in-flight request.
///
/// # Example
///
/// ```ignore
/// use volley_stack::transport::{HttpClient, HttpError, HttpRequest, TransportResponse};
///
/// struct CannedClient;
///
/// impl HttpClient for CannedClient {
///     async fn request(&self, _req: HttpRequest) -> Result<TransportResponse, HttpError> {
///         Ok(TransportResponse::new(200).with_body("ok"))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends an HTTP request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when:
    /// - Network connection fails ([`HttpError::Connection`])
    /// - Request times out ([`HttpError::Timeout`])
    /// - URL is rejected by the transport ([`HttpError::InvalidUrl`])
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<TransportResponse, HttpError>> + Send;
}
