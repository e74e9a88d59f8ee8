//! Tests for `RequestAdapter`.

use super::stack::RequestAdapter;
use super::{AdapterError, IsRetryable};
use crate::context::{AmbientContext, DeviceIdentity, header};
use crate::request::{
    AuthError, CannedRequestBuilder, DefaultRetryPolicy, FormRequest, JsonRequest, Method, Params,
    Request, RetryPolicy, StringRequest, TextBody,
};
use crate::transport::{
    BodyStream, HttpClient, HttpError, HttpRequest, RawHeader, TransportResponse,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock HTTP client that returns a configurable sequence of responses.
#[derive(Debug)]
struct MockClient {
    responses: Mutex<Vec<Result<TransportResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    fn new(responses: Vec<Result<TransportResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    fn ok() -> Self {
        Self::new(vec![Ok(TransportResponse::new(200).with_body("ok"))])
    }

    fn responding(response: TransportResponse) -> Self {
        Self::new(vec![Ok(response)])
    }

    fn failing(error: HttpError) -> Self {
        Self::new(vec![Err(error)])
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn last_request(&self) -> HttpRequest {
        self.captured_requests()
            .pop()
            .expect("no request was captured")
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<TransportResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
        self.responses.lock().unwrap().remove(0)
    }
}

impl HttpClient for Arc<MockClient> {
    async fn request(&self, req: HttpRequest) -> Result<TransportResponse, HttpError> {
        (**self).request(req).await
    }
}

fn identity() -> DeviceIdentity {
    DeviceIdentity::new("4.2.0")
        .with_device("Acme", "Phone 7")
        .with_os_version("14")
}

fn context() -> Arc<AmbientContext> {
    Arc::new(AmbientContext::new(identity(), Some("WIFI".into()), false))
}

fn adapter(client: Arc<MockClient>) -> RequestAdapter<Arc<MockClient>> {
    RequestAdapter::new(client, context())
}

fn string_request(method: Method, url: &str) -> CannedRequestBuilder<TextBody> {
    StringRequest::builder(method, url, |_| {}, |_| {})
}

fn header_of<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers.get(name).and_then(|v| v.to_str().ok())
}

fn no_extra() -> HashMap<String, String> {
    HashMap::new()
}

mod body_strategy {
    use super::*;

    #[tokio::test]
    async fn test_post_sends_body_and_content_type() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = JsonRequest::<serde_json::Value>::builder(
            Method::Post,
            "https://api.example.com/v4/reviews",
            |_| {},
            |_| {},
        )
        .with_request_body(serde_json::json!({"rating": 5}))
        .build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.last_request();
        assert_eq!(sent.method, http::Method::POST);
        assert_eq!(sent.body.as_deref(), Some(br#"{"rating":5}"#.as_slice()));
        assert_eq!(
            header_of(&sent, "content-type"),
            Some("application/json; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn test_put_and_patch_and_delete_send_body() {
        for (method, wire) in [
            (Method::Put, http::Method::PUT),
            (Method::Patch, http::Method::PATCH),
            (Method::Delete, http::Method::DELETE),
        ] {
            let client = Arc::new(MockClient::ok());
            let adapter = adapter(Arc::clone(&client));
            let url = "https://api.example.com/items/1";
            let request = FormRequest::builder(method, url, |_| {}, |_| {})
                .with_request_body("name=value")
                .build();

            adapter.execute(&request, &no_extra()).await.unwrap();

            let sent = client.last_request();
            assert_eq!(sent.method, wire);
            assert_eq!(sent.body.as_deref(), Some(b"name=value".as_slice()));
            assert_eq!(
                header_of(&sent, "content-type"),
                Some("application/x-www-form-urlencoded")
            );
        }
    }

    #[tokio::test]
    async fn test_post_without_body_sends_empty_placeholder() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Post, "https://api.example.com/ping").build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.last_request();
        assert_eq!(sent.method, http::Method::POST);
        assert_eq!(sent.body, Some(Vec::new()));
        assert!(sent.headers.get("content-type").is_none());
    }

    #[tokio::test]
    async fn test_post_with_empty_body_sends_empty_placeholder() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Post, "https://api.example.com/ping")
            .with_request_body("")
            .build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.last_request();
        assert_eq!(sent.body, Some(Vec::new()));
        assert!(sent.headers.get("content-type").is_none());
    }

    #[tokio::test]
    async fn test_get_and_head_send_no_body() {
        let cases = [
            (Method::Get, http::Method::GET),
            (Method::Head, http::Method::HEAD),
        ];
        for (method, wire) in cases {
            let client = Arc::new(MockClient::ok());
            let adapter = adapter(Arc::clone(&client));
            let request = string_request(method, "https://api.example.com/videos")
                .with_request_body("ignored")
                .build();

            adapter.execute(&request, &no_extra()).await.unwrap();

            let sent = client.last_request();
            assert_eq!(sent.method, wire);
            assert!(sent.body.is_none());
            assert!(sent.headers.get("content-type").is_none());
        }
    }

    #[tokio::test]
    async fn test_legacy_method_with_body_is_post() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::DeprecatedGetOrPost, "https://api.example.com/legacy")
            .with_request_body("payload")
            .build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.last_request();
        assert_eq!(sent.method, http::Method::POST);
        assert_eq!(sent.body.as_deref(), Some(b"payload".as_slice()));
    }

    #[tokio::test]
    async fn test_legacy_method_without_body_is_get() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::DeprecatedGetOrPost, "https://api.example.com/legacy")
            .with_param("q", "1")
            .build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.last_request();
        assert_eq!(sent.method, http::Method::GET);
        assert!(sent.body.is_none());
        assert_eq!(sent.url.as_str(), "https://api.example.com/legacy?q=1");
    }

    #[tokio::test]
    async fn test_options_and_trace_are_rejected_before_sending() {
        for method in [Method::Options, Method::Trace] {
            let client = Arc::new(MockClient::ok());
            let adapter = adapter(Arc::clone(&client));
            let request = string_request(method, "https://api.example.com/").build();

            let err = adapter.execute(&request, &no_extra()).await.unwrap_err();

            assert!(matches!(err, AdapterError::InvalidMethod(m) if m == method));
            assert!(!err.is_retryable());
            assert_eq!(client.calls(), 0);
        }
    }
}

mod headers {
    use super::*;

    #[tokio::test]
    async fn test_ambient_headers_are_sent() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.last_request();
        assert_eq!(header_of(&sent, header::APP_VERSION), Some("4.2.0"));
        assert_eq!(header_of(&sent, header::MANUFACTURER), Some("Acme"));
        assert_eq!(header_of(&sent, header::DEVICE_MODEL), Some("Phone 7"));
        assert_eq!(header_of(&sent, header::OS_VERSION), Some("14"));
        assert_eq!(header_of(&sent, header::CONNECTION_TYPE), Some("WIFI"));
        assert_eq!(header_of(&sent, header::RETRIES), Some("0"));
        assert!(sent.headers.get(header::CARRIER).is_none());
        assert!(sent.headers.get(header::TEST).is_none());
    }

    #[tokio::test]
    async fn test_extra_headers_override_request_headers() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos")
            .with_header("X-Session", "from-request")
            .with_header("X-Locale", "en")
            .build();
        let extra = HashMap::from([("x-session".to_string(), "from-call".to_string())]);

        adapter.execute(&request, &extra).await.unwrap();

        let sent = client.last_request();
        let sessions: Vec<_> = sent.headers.get_all("x-session").iter().collect();
        assert_eq!(sessions, vec!["from-call"]);
        assert_eq!(header_of(&sent, "x-locale"), Some("en"));
    }

    #[tokio::test]
    async fn test_ambient_headers_override_everything() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos")
            .with_header(header::RETRIES, "99")
            .build();
        let extra = HashMap::from([(header::APP_VERSION.to_string(), "0.0.1".to_string())]);

        adapter.execute(&request, &extra).await.unwrap();

        let sent = client.last_request();
        assert_eq!(header_of(&sent, header::RETRIES), Some("0"));
        assert_eq!(header_of(&sent, header::APP_VERSION), Some("4.2.0"));
    }

    #[tokio::test]
    async fn test_retry_header_follows_policy() {
        let client = Arc::new(MockClient::new(vec![
            Ok(TransportResponse::new(200)),
            Ok(TransportResponse::new(200)),
        ]));
        let adapter = adapter(Arc::clone(&client));
        let policy = Arc::new(DefaultRetryPolicy::new());
        let request = string_request(Method::Get, "https://api.example.com/videos")
            .with_retry_policy(policy.clone())
            .build();

        adapter.execute(&request, &no_extra()).await.unwrap();
        policy.retry().unwrap();
        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.captured_requests();
        assert_eq!(header_of(&sent[0], header::RETRIES), Some("0"));
        assert_eq!(header_of(&sent[1], header::RETRIES), Some("1"));
    }

    #[tokio::test]
    async fn test_test_header_sent_when_enabled() {
        let client = Arc::new(MockClient::ok());
        let context = Arc::new(AmbientContext::new(identity(), None, true));
        let adapter = RequestAdapter::new(Arc::clone(&client), context);
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.last_request();
        assert_eq!(header_of(&sent, header::TEST), Some("true"));
        assert!(sent.headers.get(header::CONNECTION_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_connection_update_is_visible_to_next_call() {
        let client = Arc::new(MockClient::new(vec![
            Ok(TransportResponse::new(200)),
            Ok(TransportResponse::new(200)),
        ]));
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        adapter.execute(&request, &no_extra()).await.unwrap();
        adapter.update_connection_type(Some("LTE".into()));
        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.captured_requests();
        assert_eq!(header_of(&sent[0], header::CONNECTION_TYPE), Some("WIFI"));
        assert_eq!(header_of(&sent[1], header::CONNECTION_TYPE), Some("LTE"));
    }

    #[tokio::test]
    async fn test_invalid_header_value_is_rejected() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos")
            .with_header("X-Broken", "line\nbreak")
            .build();

        let err = adapter.execute(&request, &no_extra()).await.unwrap_err();

        assert!(matches!(err, AdapterError::InvalidHeader { ref name, .. } if name == "X-Broken"));
        assert_eq!(client.calls(), 0);
    }
}

mod image_accept {
    use super::*;

    #[tokio::test]
    async fn test_image_host_gets_webp_accept() {
        let client = Arc::new(MockClient::ok());
        let context = Arc::new(AmbientContext::new(
            identity().with_webp_support(true),
            None,
            false,
        ));
        let adapter = RequestAdapter::new(Arc::clone(&client), context);
        let request = string_request(Method::Get, "https://3.viki.io/v4/image.jpg").build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        assert_eq!(
            header_of(&client.last_request(), "accept"),
            Some("image/webp;image/jpg;image/png")
        );
    }

    #[tokio::test]
    async fn test_image_host_without_webp_support() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://12.viki.io/poster.png")
            .with_header("Accept", "application/json")
            .build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        let sent = client.last_request();
        let accepts: Vec<_> = sent.headers.get_all("accept").iter().collect();
        assert_eq!(accepts, vec!["image/jpg;image/png"]);
    }

    #[tokio::test]
    async fn test_other_hosts_keep_merged_accept() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.viki.io/v4/videos.json")
            .with_header("Accept", "application/json")
            .build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        assert_eq!(
            header_of(&client.last_request(), "accept"),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_custom_image_host_pattern() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client))
            .with_image_host_pattern(regex::Regex::new(r"img\.example\.com").unwrap());
        let request = string_request(Method::Get, "https://img.example.com/a.jpg").build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        assert_eq!(
            header_of(&client.last_request(), "accept"),
            Some("image/jpg;image/png")
        );
    }
}

mod url_and_timeout {
    use super::*;

    #[tokio::test]
    async fn test_get_params_become_query_string() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/search?lang=en")
            .with_param("q", "hello world")
            .with_null_param("page")
            .build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        assert_eq!(
            client.last_request().url.as_str(),
            "https://api.example.com/search?lang=en&q=hello+world&page=null"
        );
    }

    #[tokio::test]
    async fn test_post_params_are_not_appended() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Post, "https://api.example.com/search")
            .with_param("q", "x")
            .build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        assert_eq!(
            client.last_request().url.as_str(),
            "https://api.example.com/search"
        );
    }

    #[tokio::test]
    async fn test_timeout_comes_from_retry_policy() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        adapter.execute(&request, &no_extra()).await.unwrap();

        assert_eq!(
            client.last_request().timeout,
            Some(Duration::from_millis(2500))
        );
    }

    #[tokio::test]
    async fn test_unparseable_url_is_transport_error() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "not a url").build();

        let err = adapter.execute(&request, &no_extra()).await.unwrap_err();

        assert!(matches!(
            err,
            AdapterError::Transport {
                source: HttpError::InvalidUrl(_),
                ..
            }
        ));
        assert!(!err.is_retryable());
        assert_eq!(client.calls(), 0);
    }
}

mod responses {
    use super::*;

    #[tokio::test]
    async fn test_ok_response_is_normalized() {
        let response = TransportResponse::new(200)
            .with_header(RawHeader::unnamed(vec!["HTTP/1.1 200 OK".into()]))
            .with_header(RawHeader::new("Content-Type", vec!["text/plain".into()]))
            .with_header(RawHeader::new(
                "Set-Cookie",
                vec!["a=1".into(), "b=2".into()],
            ))
            .with_body("hello");
        let client = Arc::new(MockClient::responding(response));
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        let normalized = adapter.execute(&request, &no_extra()).await.unwrap();

        assert_eq!(normalized.status(), http::StatusCode::OK);
        assert_eq!(normalized.headers().len(), 3);
        assert_eq!(normalized.header("content-type"), Some("text/plain"));
        assert_eq!(normalized.content_length(), Some(5));
        assert_eq!(normalized.bytes().await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_unknown_length_body_is_still_exposed() {
        let response = TransportResponse {
            status: Some(200),
            headers: Vec::new(),
            content_length: None,
            body: Some(BodyStream::from_bytes("streamed")),
        };
        let client = Arc::new(MockClient::responding(response));
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        let normalized = adapter.execute(&request, &no_extra()).await.unwrap();

        assert!(normalized.has_body());
        assert_eq!(normalized.content_length(), None);
        assert_eq!(normalized.bytes().await.unwrap(), b"streamed");
    }

    #[tokio::test]
    async fn test_bodyless_statuses_have_no_body() {
        for status in [204, 304] {
            let client = Arc::new(MockClient::responding(
                TransportResponse::new(status).with_body("junk"),
            ));
            let adapter = adapter(Arc::clone(&client));
            let request = string_request(Method::Get, "https://api.example.com/videos").build();

            let normalized = adapter.execute(&request, &no_extra()).await.unwrap();

            assert_eq!(normalized.status().as_u16(), status);
            assert!(!normalized.has_body());
            assert_eq!(normalized.content_length(), None);
        }
    }

    #[tokio::test]
    async fn test_head_response_has_no_body() {
        let client = Arc::new(MockClient::responding(
            TransportResponse::new(200).with_body("junk"),
        ));
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Head, "https://api.example.com/videos").build();

        let normalized = adapter.execute(&request, &no_extra()).await.unwrap();

        assert!(!normalized.has_body());
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let client = Arc::new(MockClient::responding(
            TransportResponse::new(503).with_body("busy"),
        ));
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        let normalized = adapter.execute(&request, &no_extra()).await.unwrap();

        assert_eq!(normalized.status(), http::StatusCode::SERVICE_UNAVAILABLE);
        assert!(normalized.has_body());
    }

    #[tokio::test]
    async fn test_missing_status_is_transport_error() {
        let response = TransportResponse {
            status: None,
            headers: Vec::new(),
            content_length: None,
            body: None,
        };
        let client = Arc::new(MockClient::responding(response));
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        let err = adapter.execute(&request, &no_extra()).await.unwrap_err();

        assert!(matches!(
            err,
            AdapterError::Transport {
                source: HttpError::StatusUnavailable,
                ..
            }
        ));
        assert!(!err.is_retryable());
    }
}

mod failures {
    use super::*;

    /// Request whose credential provider has nothing to offer.
    struct SignedOutRequest {
        policy: DefaultRetryPolicy,
    }

    impl Request for SignedOutRequest {
        fn method(&self) -> Method {
            Method::Get
        }

        fn url(&self) -> &str {
            "https://api.example.com/me"
        }

        fn headers(&self) -> Result<HashMap<String, String>, AuthError> {
            Err(AuthError::new("no session token"))
        }

        fn params(&self) -> Result<Params, AuthError> {
            Ok(Params::new())
        }

        fn retry_policy(&self) -> &dyn RetryPolicy {
            &self.policy
        }
    }

    #[tokio::test]
    async fn test_auth_error_propagates_unchanged() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request = SignedOutRequest {
            policy: DefaultRetryPolicy::new(),
        };

        let err = adapter.execute(&request, &no_extra()).await.unwrap_err();

        match err {
            AdapterError::Auth(auth) => assert_eq!(auth.reason, "no session token"),
            other => panic!("expected auth error, got {other:?}"),
        }
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_retryable_transport_error() {
        let client = Arc::new(MockClient::failing(HttpError::Timeout));
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Get, "https://api.example.com/videos").build();

        let err = adapter.execute(&request, &no_extra()).await.unwrap_err();

        assert!(err.is_retryable());
        let message = err.to_string();
        assert!(message.contains("GET"));
        assert!(message.contains("https://api.example.com/videos"));
    }

    #[tokio::test]
    async fn test_connection_error_is_retryable() {
        let client = Arc::new(MockClient::failing(HttpError::Connection(
            "connection reset".into(),
        )));
        let adapter = adapter(Arc::clone(&client));
        let request = string_request(Method::Post, "https://api.example.com/videos").build();

        let err = adapter.execute(&request, &no_extra()).await.unwrap_err();

        assert!(matches!(err, AdapterError::Transport { method: Method::Post, .. }));
        assert!(err.is_retryable());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_adapter_works_through_trait_object() {
        let client = Arc::new(MockClient::ok());
        let adapter = adapter(Arc::clone(&client));
        let request: Box<dyn Request> =
            Box::new(string_request(Method::Get, "https://api.example.com/videos").build());

        let normalized = adapter.execute(request.as_ref(), &no_extra()).await.unwrap();

        assert_eq!(normalized.status(), http::StatusCode::OK);
    }
}
