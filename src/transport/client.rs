//! Production HTTP client implementation using reqwest.

use tokio_stream::StreamExt;

use super::{BodyStream, HttpClient, HttpError, HttpRequest, RawHeader, TransportResponse};

/// Production HTTP client using reqwest.
///
/// This is a thin wrapper around `reqwest::Client` that implements
/// the [`HttpClient`] trait. Connection pooling, TLS and HTTP/2 are
/// reqwest's concern; this wrapper only translates request and response
/// shapes. The response body is handed back unread as a [`BodyStream`].
///
/// # Example
///
/// ```no_run
/// use volley_stack::transport::{HttpClient, HttpRequest, ReqwestClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new();
/// let url = Url::parse("https://api.example.com/videos")?;
/// let response = client.request(HttpRequest::get(url)).await?;
/// println!("Status: {:?}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new HTTP client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Creates an HTTP client from an existing reqwest client.
    ///
    /// Useful when you need custom configuration (timeouts, TLS, etc.).
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<TransportResponse, HttpError> {
        let mut builder = self
            .inner
            .request(req.method, req.url.as_str())
            .headers(req.headers);

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        if let Some(timeout) = req.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(map_send_error)?;

        let status = Some(response.status().as_u16());
        let headers = group_headers(response.headers());
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| HttpError::Connection(Box::new(e))));

        Ok(TransportResponse {
            status,
            headers,
            content_length,
            body: Some(BodyStream::new(body)),
        })
    }
}

fn map_send_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else {
        HttpError::Connection(Box::new(e))
    }
}

/// Groups a header map into one entry per distinct name.
///
/// Values that are not valid UTF-8 are decoded lossily.
pub(super) fn group_headers(headers: &http::HeaderMap) -> Vec<RawHeader> {
    headers
        .keys()
        .map(|name| {
            let values = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect();
            RawHeader::new(name.as_str(), values)
        })
        .collect()
}
