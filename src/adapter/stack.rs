//! The request adapter.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use regex::Regex;

use crate::context::AmbientContext;
use crate::request::{Method, Request};
use crate::transport::{BodyStream, HttpClient, HttpError, HttpRequest, TransportResponse};

use super::headers::{DEFAULT_IMAGE_HOST_PATTERN, header_value, image_accept_value, merge_headers};
use super::query::resolve_url;
use super::response::{NormalizedResponse, convert_headers, has_response_body};
use super::AdapterError;

/// Adapts abstract [`Request`]s onto an [`HttpClient`].
///
/// The adapter is stateless apart from the shared [`AmbientContext`]; one
/// instance serves every concurrent call. Each call to [`execute`] is a
/// single attempt: retrying is left to the caller.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
///
/// # Example
///
/// ```no_run
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use volley_stack::adapter::RequestAdapter;
/// use volley_stack::context::{AmbientContext, DeviceIdentity};
/// use volley_stack::request::{Method, StringRequest};
/// use volley_stack::transport::ReqwestClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let context = AmbientContext::new(DeviceIdentity::new("4.2.0"), Some("WIFI".into()), false);
/// let adapter = RequestAdapter::new(ReqwestClient::new(), Arc::new(context));
///
/// let request = StringRequest::builder(
///     Method::Get,
///     "https://api.example.com/videos",
///     |body: String| println!("{body}"),
///     |err| eprintln!("{err}"),
/// )
/// .build();
///
/// let response = adapter.execute(&request, &HashMap::new()).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
///
/// [`execute`]: RequestAdapter::execute
#[derive(Debug)]
pub struct RequestAdapter<H> {
    client: H,
    context: Arc<AmbientContext>,
    image_hosts: Regex,
}

/// Method and body chosen for the wire.
struct Outgoing {
    method: http::Method,
    body: Option<Vec<u8>>,
    content_type: Option<HeaderValue>,
}

impl Outgoing {
    const fn bodyless(method: http::Method) -> Self {
        Self {
            method,
            body: None,
            content_type: None,
        }
    }
}

impl<H> RequestAdapter<H> {
    /// Creates an adapter matching image hosts with [`DEFAULT_IMAGE_HOST_PATTERN`].
    ///
    /// # Panics
    ///
    /// Panics if the built-in pattern fails to compile.
    #[must_use]
    pub fn new(client: H, context: Arc<AmbientContext>) -> Self {
        let image_hosts =
            Regex::new(DEFAULT_IMAGE_HOST_PATTERN).expect("default image host pattern is valid");
        Self {
            client,
            context,
            image_hosts,
        }
    }

    /// Sets the pattern identifying image hosts.
    #[must_use]
    pub fn with_image_host_pattern(mut self, pattern: Regex) -> Self {
        self.image_hosts = pattern;
        self
    }

    /// Publishes a new connection type for subsequent calls.
    pub fn update_connection_type(&self, connection_type: Option<String>) {
        self.context.update_connection_type(connection_type);
    }
}

impl<H: HttpClient> RequestAdapter<H> {
    /// Executes one attempt of `request`.
    ///
    /// `extra_headers` override the request's own headers; ambient headers
    /// override both.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`AdapterError::Auth`] if the request cannot produce headers or params
    /// - [`AdapterError::Encoding`] if the body cannot be encoded
    /// - [`AdapterError::InvalidMethod`] for OPTIONS and TRACE
    /// - [`AdapterError::InvalidHeader`] if a header cannot be sent
    /// - [`AdapterError::Transport`] if the URL is rejected, the call fails,
    ///   or no status code is available
    pub async fn execute<R>(
        &self,
        request: &R,
        extra_headers: &HashMap<String, String>,
    ) -> Result<NormalizedResponse, AdapterError>
    where
        R: Request + ?Sized,
    {
        let http_request = self.build_request(request, extra_headers)?;
        let method = request.method();
        let url = http_request.url.to_string();

        tracing::debug!(
            %method,
            %url,
            retries = request.retry_policy().current_retry_count(),
            "Executing request"
        );

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|source| {
                tracing::warn!(%method, %url, error = %source, "Transport failed");
                AdapterError::Transport {
                    method,
                    url: url.clone(),
                    source,
                }
            })?;

        normalize(method, response).map_err(|source| AdapterError::Transport {
            method,
            url,
            source,
        })
    }

    /// Builds the wire request without sending it.
    fn build_request<R>(
        &self,
        request: &R,
        extra_headers: &HashMap<String, String>,
    ) -> Result<HttpRequest, AdapterError>
    where
        R: Request + ?Sized,
    {
        let method = request.method();
        let url = resolve_url(method, request.url(), &request.params()?);
        let retry_policy = request.retry_policy();

        let mut headers = HeaderMap::new();
        merge_headers(&mut headers, &request.headers()?)?;
        merge_headers(&mut headers, extra_headers)?;
        merge_headers(
            &mut headers,
            self.context
                .ambient_headers(retry_policy.current_retry_count()),
        )?;

        if self.image_hosts.is_match(&url) {
            let accept = image_accept_value(self.context.identity().supports_webp);
            headers.insert(ACCEPT, HeaderValue::from_static(accept));
        }

        let parsed = url::Url::parse(&url).map_err(|e| AdapterError::Transport {
            method,
            url: url.clone(),
            source: HttpError::InvalidUrl(e.to_string()),
        })?;

        let outgoing = Self::outgoing(method, request, &url)?;
        if let Some(content_type) = outgoing.content_type {
            headers.insert(CONTENT_TYPE, content_type);
        }

        Ok(HttpRequest {
            method: outgoing.method,
            url: parsed,
            headers,
            body: outgoing.body,
            timeout: Some(retry_policy.current_timeout()),
        })
    }

    /// Picks the wire method and body for `method`.
    fn outgoing<R>(method: Method, request: &R, url: &str) -> Result<Outgoing, AdapterError>
    where
        R: Request + ?Sized,
    {
        match method {
            Method::DeprecatedGetOrPost => match encoded_body(request, url)? {
                Some(body) => attach_body(http::Method::POST, Some(body), request),
                None => Ok(Outgoing::bodyless(http::Method::GET)),
            },
            Method::Get => Ok(Outgoing::bodyless(http::Method::GET)),
            Method::Head => Ok(Outgoing::bodyless(http::Method::HEAD)),
            Method::Delete => {
                attach_body(http::Method::DELETE, encoded_body(request, url)?, request)
            }
            Method::Post => {
                attach_body(http::Method::POST, encoded_body(request, url)?, request)
            }
            Method::Put => {
                attach_body(http::Method::PUT, encoded_body(request, url)?, request)
            }
            Method::Patch => {
                attach_body(http::Method::PATCH, encoded_body(request, url)?, request)
            }
            Method::Options | Method::Trace => Err(AdapterError::InvalidMethod(method)),
        }
    }
}

fn encoded_body<R>(request: &R, url: &str) -> Result<Option<Vec<u8>>, AdapterError>
where
    R: Request + ?Sized,
{
    request.body().map_err(|source| AdapterError::Encoding {
        url: url.to_string(),
        source,
    })
}

/// Attaches `body` with its declared content type, or an empty placeholder.
///
/// The placeholder (zero bytes, no `Content-Type`) is used when either the
/// body or the declared content type is missing or empty.
fn attach_body<R>(
    method: http::Method,
    body: Option<Vec<u8>>,
    request: &R,
) -> Result<Outgoing, AdapterError>
where
    R: Request + ?Sized,
{
    let content_type = request.body_content_type();
    match body {
        Some(body) if !body.is_empty() && !content_type.is_empty() => Ok(Outgoing {
            method,
            body: Some(body),
            content_type: Some(header_value(CONTENT_TYPE.as_str(), content_type)?),
        }),
        _ => Ok(Outgoing {
            method,
            body: Some(Vec::new()),
            content_type: None,
        }),
    }
}

/// Converts a transport response into a [`NormalizedResponse`].
fn normalize(method: Method, response: TransportResponse) -> Result<NormalizedResponse, HttpError> {
    let status = response
        .status
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or(HttpError::StatusUnavailable)?;

    let headers = convert_headers(response.headers);

    if !has_response_body(method, status) {
        return Ok(NormalizedResponse::without_body(status, headers));
    }

    let stream = response.body.unwrap_or_else(BodyStream::empty);
    Ok(NormalizedResponse::with_body(
        status,
        headers,
        response.content_length,
        stream,
    ))
}
