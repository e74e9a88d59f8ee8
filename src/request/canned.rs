//! Canned requests built through an accumulating builder.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::adapter::{AdapterError, Header};

use super::{
    DefaultRetryPolicy, EncodingError, FormBody, JsonBody, Method, ParseError, Params, Request,
    RequestBody, RetryPolicy, TextBody,
};

/// Callback receiving a parsed response.
pub type Listener<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Callback receiving a request failure.
pub type ErrorListener = Arc<dyn Fn(&AdapterError) + Send + Sync>;

/// Request with a plain string body.
pub type StringRequest = CannedRequest<TextBody>;

/// Request with a `serde_json`-serialized body.
pub type JsonRequest<T = serde_json::Value> = CannedRequest<JsonBody<T>>;

/// Request with a pre-encoded form body.
pub type FormRequest = CannedRequest<FormBody>;

/// A pre-configured request whose body rules come from `B`.
///
/// Immutable once built. The retry policy is shared so the queue can
/// advance it between attempts while the adapter reads it.
pub struct CannedRequest<B: RequestBody> {
    method: Method,
    url: String,
    headers: HashMap<String, String>,
    params: Params,
    body: Option<B>,
    retry_policy: Arc<dyn RetryPolicy>,
    listener: Listener<B::Output>,
    error_listener: ErrorListener,
}

impl<B: RequestBody> CannedRequest<B> {
    /// Starts a builder for this request kind.
    pub fn builder(
        method: Method,
        url: impl Into<String>,
        listener: impl Fn(B::Output) + Send + Sync + 'static,
        error_listener: impl Fn(&AdapterError) + Send + Sync + 'static,
    ) -> CannedRequestBuilder<B> {
        CannedRequestBuilder::new(method, url, listener, error_listener)
    }

    /// Returns a handle to the shared retry policy.
    #[must_use]
    pub fn shared_retry_policy(&self) -> Arc<dyn RetryPolicy> {
        Arc::clone(&self.retry_policy)
    }

    /// Parses response bytes according to this request's body kind.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the response cannot be parsed.
    pub fn parse_response(&self, data: &[u8], headers: &[Header]) -> Result<B::Output, ParseError> {
        B::parse(data, headers)
    }

    /// Hands a parsed response to the success callback.
    pub fn deliver_response(&self, response: B::Output) {
        (self.listener)(response);
    }

    /// Hands a failure to the error callback.
    pub fn deliver_error(&self, error: &AdapterError) {
        (self.error_listener)(error);
    }
}

impl<B: RequestBody> Request for CannedRequest<B> {
    fn method(&self) -> Method {
        self.method
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn headers(&self) -> Result<HashMap<String, String>, super::AuthError> {
        Ok(self.headers.clone())
    }

    fn params(&self) -> Result<Params, super::AuthError> {
        Ok(self.params.clone())
    }

    fn body(&self) -> Result<Option<Vec<u8>>, EncodingError> {
        self.body.as_ref().map(RequestBody::encode).transpose()
    }

    fn body_content_type(&self) -> &str {
        B::CONTENT_TYPE
    }

    fn retry_policy(&self) -> &dyn RetryPolicy {
        self.retry_policy.as_ref()
    }

    fn cache_key(&self) -> String {
        concatenated_cache_key(&self.url, &self.params)
    }
}

impl<B: RequestBody + fmt::Debug> fmt::Debug for CannedRequest<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CannedRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Builds the cache key shared by every canned request kind.
///
/// The URL is followed by each parameter's key and value, in insertion
/// order, with no separators; null values contribute `null`. Distinct
/// parameter sets can therefore collide (`a=bc` and `ab=c`), and stored
/// cache entries depend on exactly this shape.
#[must_use]
pub fn concatenated_cache_key(url: &str, params: &Params) -> String {
    let mut key = String::from(url);
    for (name, value) in params.iter() {
        key.push_str(name);
        key.push_str(value.unwrap_or("null"));
    }
    key
}

/// Accumulating builder for [`CannedRequest`].
///
/// Headers and params start empty, the body starts absent and the retry
/// policy defaults to a fresh [`DefaultRetryPolicy`].
///
/// # Example
///
/// ```
/// use volley_stack::request::{Method, Request, StringRequest};
///
/// let request = StringRequest::builder(
///     Method::Get,
///     "https://api.example.com/videos",
///     |body: String| println!("{body}"),
///     |err| eprintln!("{err}"),
/// )
/// .with_param("page", "2")
/// .build();
///
/// assert_eq!(request.cache_key(), "https://api.example.com/videospage2");
/// ```
pub struct CannedRequestBuilder<B: RequestBody> {
    method: Method,
    url: String,
    headers: HashMap<String, String>,
    params: Params,
    body: Option<B>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    listener: Listener<B::Output>,
    error_listener: ErrorListener,
}

impl<B: RequestBody> CannedRequestBuilder<B> {
    /// Creates a builder with the required fields.
    pub fn new(
        method: Method,
        url: impl Into<String>,
        listener: impl Fn(B::Output) + Send + Sync + 'static,
        error_listener: impl Fn(&AdapterError) + Send + Sync + 'static,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            params: Params::new(),
            body: None,
            retry_policy: None,
            listener: Arc::new(listener),
            error_listener: Arc::new(error_listener),
        }
    }

    /// Merges headers into those already set; later values win.
    #[must_use]
    pub fn with_additional_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets a single header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replaces all params.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Adds or replaces a single param.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Adds or replaces a param with a null value.
    #[must_use]
    pub fn with_null_param(mut self, key: impl Into<String>) -> Self {
        self.params.insert_null(key);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_request_body(mut self, body: impl Into<B>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Shares an existing retry policy with the request.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Finishes the request.
    #[must_use]
    pub fn build(self) -> CannedRequest<B> {
        CannedRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            params: self.params,
            body: self.body,
            retry_policy: self
                .retry_policy
                .unwrap_or_else(|| Arc::new(DefaultRetryPolicy::new())),
            listener: self.listener,
            error_listener: self.error_listener,
        }
    }
}

impl<B: RequestBody> fmt::Debug for CannedRequestBuilder<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CannedRequestBuilder")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("has_body", &self.body.is_some())
            .finish_non_exhaustive()
    }
}
