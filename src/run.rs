//! Application execution logic.
//!
//! This module builds the canned request described by the configuration,
//! sends it through the request adapter with retries, and renders the
//! delivered response.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use http::StatusCode;
use thiserror::Error;
use tokio::sync::mpsc;

use volley_stack::adapter::{AdapterError, Header, IsRetryable, NormalizedResponse, RequestAdapter};
use volley_stack::config::{BodyConfig, ValidatedConfig};
use volley_stack::context::{AmbientContext, FixedProbe};
use volley_stack::request::{
    CannedRequest, DefaultRetryPolicy, FormBody, JsonBody, ParseError, Request, RequestBody,
    TextBody,
};
use volley_stack::transport::{HttpClient, HttpError, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The request failed after all allowed attempts.
    #[error("Request failed: {0}")]
    Request(#[from] AdapterError),

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(#[source] HttpError),

    /// The response body could not be parsed.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] ParseError),

    /// The server answered with a client or server error status.
    #[error("Server responded with {0}")]
    Status(StatusCode),
}

/// The outcome of one request: what the server sent and what the listener received.
#[derive(Debug)]
pub struct Exchange {
    /// Response status
    pub status: StatusCode,
    /// Response headers, in transport order
    pub headers: Vec<Header>,
    /// Parsed body as delivered to the listener, `None` for bodyless responses
    pub body: Option<String>,
}

impl Exchange {
    /// Returns an error for 4xx and 5xx statuses.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Status`] when the status is a client or server error.
    pub fn ensure_success(&self) -> Result<(), RunError> {
        if self.status.is_client_error() || self.status.is_server_error() {
            Err(RunError::Status(self.status))
        } else {
            Ok(())
        }
    }

    /// Renders the exchange for standard output.
    ///
    /// With `include_headers` the status line and headers come first,
    /// followed by a blank line, like `curl -i`.
    #[must_use]
    pub fn render(&self, include_headers: bool) -> String {
        let mut out = String::new();
        if include_headers {
            let _ = writeln!(out, "HTTP {}", self.status);
            for header in &self.headers {
                let _ = writeln!(out, "{}: {}", header.name, header.value);
            }
            out.push('\n');
        }
        if let Some(body) = &self.body {
            out.push_str(body);
        }
        out
    }
}

/// Executes the configured request and prints the response.
///
/// # Errors
///
/// Returns an error if:
/// - Every attempt failed or the failure was not retryable
/// - The response body could not be read or parsed
/// - The server answered with a 4xx or 5xx status
///
/// # Coverage Note
///
/// This function is excluded from coverage because it performs real network I/O.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let context = Arc::new(AmbientContext::from_probe(
        config.identity.clone(),
        &FixedProbe(config.connection_type),
        config.send_test_header,
    ));
    let adapter = RequestAdapter::new(ReqwestClient::new(), context)
        .with_image_host_pattern(config.image_host_pattern.clone());

    let exchange = perform(&adapter, &config).await?;
    tracing::info!(status = %exchange.status, "Request completed");

    println!("{}", exchange.render(config.include_headers));
    exchange.ensure_success()
}

/// Builds the request for the configured body kind and performs it.
async fn perform<H: HttpClient>(
    adapter: &RequestAdapter<H>,
    config: &ValidatedConfig,
) -> Result<Exchange, RunError> {
    match &config.body {
        BodyConfig::Text(body) => deliver(adapter, config, body.clone().map(TextBody)).await,
        BodyConfig::Json(body) => deliver(adapter, config, body.clone().map(JsonBody)).await,
        BodyConfig::Form(body) => deliver(adapter, config, body.clone().map(FormBody)).await,
    }
}

/// Sends one canned request and hands the parsed response to its listener.
async fn deliver<H, B>(
    adapter: &RequestAdapter<H>,
    config: &ValidatedConfig,
    body: Option<B>,
) -> Result<Exchange, RunError>
where
    H: HttpClient,
    B: RequestBody + 'static,
    B::Output: fmt::Display,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let request = canned(config, body, tx);
    tracing::debug!(cache_key = %request.cache_key(), "Request prepared");

    let response = match send_with_retries(adapter, &request).await {
        Ok(response) => response,
        Err(e) => {
            request.deliver_error(&e);
            return Err(e.into());
        }
    };

    let (status, headers, body) = response.into_parts();
    let Some(body) = body else {
        return Ok(Exchange {
            status,
            headers,
            body: None,
        });
    };

    let data = body.stream.read_to_end().await.map_err(RunError::Body)?;
    let parsed = request.parse_response(&data, &headers)?;
    request.deliver_response(parsed);

    Ok(Exchange {
        status,
        headers,
        body: rx.try_recv().ok(),
    })
}

/// Builds the canned request; its listener forwards the rendered body to `sink`.
fn canned<B>(
    config: &ValidatedConfig,
    body: Option<B>,
    sink: mpsc::UnboundedSender<String>,
) -> CannedRequest<B>
where
    B: RequestBody + 'static,
    B::Output: fmt::Display,
{
    let mut builder = CannedRequest::<B>::builder(
        config.method,
        config.url.clone(),
        move |response: B::Output| {
            let _ = sink.send(response.to_string());
        },
        |error: &AdapterError| tracing::error!("Request failed: {error}"),
    )
    .with_additional_headers(config.headers.clone())
    .with_params(config.params.clone())
    .with_retry_policy(Arc::new(DefaultRetryPolicy::from_settings(
        config.retry.clone(),
    )));

    if let Some(body) = body {
        builder = builder.with_request_body(body);
    }

    builder.build()
}

/// Executes `request`, advancing its retry policy after each retryable failure.
///
/// Returns the last error once the policy reports exhaustion. Errors that
/// are not retryable are returned immediately.
async fn send_with_retries<H, R>(
    adapter: &RequestAdapter<H>,
    request: &R,
) -> Result<NormalizedResponse, AdapterError>
where
    H: HttpClient,
    R: Request + ?Sized,
{
    let extra_headers = HashMap::new();
    loop {
        match adapter.execute(request, &extra_headers).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_retryable() => {
                let policy = request.retry_policy();
                if let Err(exhausted) = policy.retry() {
                    tracing::warn!("Giving up: {exhausted}");
                    return Err(e);
                }
                tracing::warn!(
                    retries = policy.current_retry_count(),
                    timeout = ?policy.current_timeout(),
                    "Attempt failed, retrying: {e}"
                );
            }
            Err(e) => return Err(e),
        }
    }
}
