//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use log::{debug, trace};

use crate::domain::{
    AppToken, MessageInput, MessageResponse, ResponseBody, UserKey, ValidationError,
    validate_message,
};
use crate::transport::{
    BoxError, JSON_CONTENT_TYPE, MESSAGES_PATH, TransportError, decode_message_response,
    encode_message_json,
};

mod options;

pub use options::{BASE_URL_ENV, ClientOptions, DEFAULT_BASE_URL, TOKEN_ENV, USER_KEY_ENV};

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A fully built `POST` request.
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug)]
/// What the transport got back.
///
/// A body read failure is kept in `body` rather than failing the whole exchange.
pub struct HttpResponse {
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub body: Result<Vec<u8>, BoxError>,
}

/// HTTP seam used by [`PushoverClient`]; swap it via [`PushoverClientBuilder::transport`].
pub trait HttpTransport: Send + Sync {
    fn post<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let mut builder = self.client.post(&request.url);
            for (name, value) in &request.headers {
                builder = builder.header(*name, value);
            }

            let response = builder.body(request.body).send().await?;
            let status = Some(response.status().as_u16());
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body = response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(|err| Box::new(err) as BoxError);

            Ok(HttpResponse {
                status,
                content_type,
                body,
            })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`PushoverClient`].
///
/// Every variant that follows a completed HTTP exchange carries the decoded
/// response body, so service-reported detail (`errors`) stays available.
pub enum PushoverError {
    /// Client options or message failed validation; nothing was sent.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The request body could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// HTTP 200 without a `status: 1` body, or no usable status code at all.
    #[error("invalid API response")]
    InvalidResponse {
        body: Option<ResponseBody>,
        #[source]
        source: Option<BoxError>,
    },

    /// HTTP 429.
    #[error("rate-limited")]
    RateLimited { body: Option<ResponseBody> },

    /// Any other HTTP 4xx.
    #[error("invalid request")]
    InvalidRequest {
        status: u16,
        body: Option<ResponseBody>,
    },

    /// HTTP 5xx and above.
    #[error("internal server error")]
    ServerError {
        status: u16,
        body: Option<ResponseBody>,
    },

    /// Any other status, e.g. a redirect.
    #[error("unknown")]
    UnexpectedStatus {
        status: u16,
        body: Option<ResponseBody>,
    },
}

impl PushoverError {
    /// The decoded response body, when the service answered.
    pub fn response_body(&self) -> Option<&ResponseBody> {
        match self {
            Self::InvalidResponse { body, .. }
            | Self::RateLimited { body }
            | Self::InvalidRequest { body, .. }
            | Self::ServerError { body, .. }
            | Self::UnexpectedStatus { body, .. } => body.as_ref(),
            Self::Validation(_) | Self::Transport(_) | Self::Encode(_) => None,
        }
    }

    /// Error strings reported by the service, if the body carried any.
    pub fn service_errors(&self) -> &[String] {
        self.response_body()
            .map(ResponseBody::errors)
            .unwrap_or_default()
    }
}

/// Builder for [`PushoverClient`].
///
/// Use this when you need a timeout, a custom user-agent, or your own transport.
pub struct PushoverClientBuilder {
    options: ClientOptions,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    transport: Option<Box<dyn HttpTransport>>,
}

impl PushoverClientBuilder {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            timeout: None,
            user_agent: None,
            transport: None,
        }
    }

    /// Set an HTTP client timeout applied to the entire request.
    ///
    /// Ignored when a custom transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Send requests through `transport` instead of the default reqwest client.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Validate the options and build a [`PushoverClient`].
    pub fn build(self) -> Result<PushoverClient, PushoverError> {
        let validated = self.options.validate()?;

        let http = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                let client = builder
                    .build()
                    .map_err(|err| PushoverError::Transport(Box::new(err)))?;
                Box::new(ReqwestTransport { client }) as Box<dyn HttpTransport>
            }
        };

        debug!("pushover client ready for {}", validated.base_endpoint);

        Ok(PushoverClient {
            token: validated.token,
            user_key: validated.user_key,
            base_endpoint: validated.base_endpoint,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            http,
        })
    }
}

/// High-level Pushover client.
///
/// Each [`PushoverClient::notify`] validates the message, performs exactly one
/// `POST {base}/messages.json`, and classifies the outcome. Nothing is retried;
/// rate limiting is reported as [`PushoverError::RateLimited`] and left to the caller.
pub struct PushoverClient {
    token: AppToken,
    user_key: UserKey,
    base_endpoint: String,
    user_agent: String,
    http: Box<dyn HttpTransport>,
}

impl fmt::Debug for PushoverClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushoverClient")
            .field("base_endpoint", &self.base_endpoint)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl PushoverClient {
    /// Validate `options` and create a client using the default transport.
    ///
    /// For more customization, use [`PushoverClient::builder`].
    pub fn new(options: ClientOptions) -> Result<Self, PushoverError> {
        Self::builder(options).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(options: ClientOptions) -> PushoverClientBuilder {
        PushoverClientBuilder::new(options)
    }

    /// API root without a trailing slash.
    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    /// Send one notification.
    ///
    /// Errors:
    /// - [`PushoverError::Validation`] when the message is invalid (no request is made),
    /// - [`PushoverError::Transport`] when no response was obtained,
    /// - one of the status-derived variants otherwise, each carrying the response body.
    pub async fn notify(
        &self,
        message: impl Into<MessageInput>,
    ) -> Result<MessageResponse, PushoverError> {
        let message = validate_message(message)?.with_credentials(&self.token, &self.user_key);
        let body = encode_message_json(&message).map_err(PushoverError::Encode)?;

        let url = format!("{}/{}", self.base_endpoint, MESSAGES_PATH);
        debug!("POST {url}");

        let request = HttpRequest {
            url,
            headers: vec![
                ("content-type", JSON_CONTENT_TYPE.to_owned()),
                ("user-agent", self.user_agent.clone()),
            ],
            body,
        };
        let response = self
            .http
            .post(request)
            .await
            .map_err(PushoverError::Transport)?;

        let (body, body_error) =
            decode_message_response(response.content_type.as_deref(), response.body);
        trace!("response body: {body:?}");

        let outcome = classify_response(response.status, body, body_error);
        match &outcome {
            Ok(message) => debug!("message accepted, request {}", message.request),
            Err(err) => debug!("message rejected ({:?}): {err}", response.status),
        }
        outcome
    }
}

/// Create a client from `options` and send a single message with it.
pub async fn notify(
    options: ClientOptions,
    message: impl Into<MessageInput>,
) -> Result<MessageResponse, PushoverError> {
    PushoverClient::new(options)?.notify(message).await
}

fn classify_response(
    status: Option<u16>,
    body: Option<ResponseBody>,
    body_error: Option<TransportError>,
) -> Result<MessageResponse, PushoverError> {
    let source = body_error.map(|err| Box::new(err) as BoxError);

    let Some(status) = status else {
        return Err(PushoverError::InvalidResponse { body, source });
    };

    match status {
        200 => match body {
            Some(ResponseBody::Message(message)) if message.is_success() => Ok(message),
            body => Err(PushoverError::InvalidResponse { body, source }),
        },
        429 => Err(PushoverError::RateLimited { body }),
        400..=499 => Err(PushoverError::InvalidRequest { status, body }),
        500..=u16::MAX => Err(PushoverError::ServerError { status, body }),
        _ => Err(PushoverError::UnexpectedStatus { status, body }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use crate::domain::{Message, Priority};

    use super::*;

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        requests: Vec<HttpRequest>,
        response_status: Option<u16>,
        content_type: Option<String>,
        response_body: String,
        fail: bool,
    }

    impl FakeTransport {
        fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self::with_status(Some(response_status), response_body)
        }

        fn with_status(response_status: Option<u16>, response_body: impl Into<String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    requests: Vec::new(),
                    response_status,
                    content_type: Some("application/json; charset=utf-8".to_owned()),
                    response_body: response_body.into(),
                    fail: false,
                })),
            }
        }

        fn failing() -> Self {
            let transport = Self::new(200, "");
            transport.state.lock().unwrap().fail = true;
            transport
        }

        fn content_type(self, content_type: Option<&str>) -> Self {
            self.state.lock().unwrap().content_type = content_type.map(str::to_owned);
            self
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.state.lock().unwrap().requests.clone()
        }
    }

    impl HttpTransport for FakeTransport {
        fn post<'a>(
            &'a self,
            request: HttpRequest,
        ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
            Box::pin(async move {
                let mut state = self.state.lock().unwrap();
                state.requests.push(request);
                if state.fail {
                    return Err("connection refused".into());
                }
                Ok(HttpResponse {
                    status: state.response_status,
                    content_type: state.content_type.clone(),
                    body: Ok(state.response_body.clone().into_bytes()),
                })
            })
        }
    }

    fn make_client(transport: FakeTransport) -> PushoverClient {
        PushoverClient::builder(
            ClientOptions::new("app_token", "user_key").base_url("https://example.invalid/1/"),
        )
        .transport(transport)
        .build()
        .unwrap()
    }

    fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[tokio::test]
    async fn notify_sends_message_and_returns_response() {
        let transport = FakeTransport::new(200, r#"{"status":1,"request":"req-1"}"#);
        let client = make_client(transport.clone());

        let response = client.notify("hello").await.unwrap();
        assert_eq!(response.status, 1);
        assert_eq!(response.request, "req-1");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url, "https://example.invalid/1/messages.json");
        assert_eq!(header(request, "content-type"), Some("application/json"));
        assert_eq!(header(request, "user-agent"), Some(DEFAULT_USER_AGENT));

        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(
            body,
            json!({"token": "app_token", "user": "user_key", "message": "hello"})
        );
    }

    #[tokio::test]
    async fn notify_sends_normalized_fields() {
        let transport =
            FakeTransport::new(200, r#"{"status":1,"request":"req-2","receipt":"rcpt"}"#);
        let client = make_client(transport.clone());

        let message = Message {
            device: Some(vec!["a".to_owned(), "b".to_owned()].into()),
            priority: Some(Priority::Emergency),
            retry: Some(30),
            expire: Some(300),
            html: true,
            ..Message::new("<b>down</b>")
        };
        let response = client.notify(message).await.unwrap();
        assert_eq!(response.receipt.as_deref(), Some("rcpt"));

        let body: serde_json::Value =
            serde_json::from_slice(&transport.requests()[0].body).unwrap();
        assert_eq!(
            body,
            json!({
                "token": "app_token",
                "user": "user_key",
                "message": "<b>down</b>",
                "device": "a,b",
                "priority": 2,
                "html": 1,
                "retry": 30,
                "expire": 300
            })
        );
    }

    #[tokio::test]
    async fn notify_rejects_invalid_message_without_sending() {
        let transport = FakeTransport::new(200, r#"{"status":1}"#);
        let client = make_client(transport.clone());

        let err = client
            .notify(json!({"message": "x", "priority": 1000}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PushoverError::Validation(ValidationError::UnknownPriority { .. })
        ));
        assert!(err.response_body().is_none());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn notify_accepts_status_one_with_loosely_typed_fields() {
        let bodies = [
            r#"{"status":1,"request":null}"#,
            r#"{"status":1,"request":"r","user":5}"#,
            r#"{"status":1.0,"request":"r"}"#,
        ];

        for body in bodies {
            let transport = FakeTransport::new(200, body);
            let client = make_client(transport);

            let response = client.notify("hello").await;
            assert!(response.is_ok(), "{body}: {response:?}");
            assert_eq!(response.unwrap().status, 1, "{body}");
        }
    }

    #[tokio::test]
    async fn notify_maps_status_zero_to_invalid_response() {
        let transport = FakeTransport::new(200, r#"{"status":0}"#);
        let client = make_client(transport);

        let err = client.notify("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid API response");
        match err {
            PushoverError::InvalidResponse { body, source } => {
                assert_eq!(body.unwrap().as_message().unwrap().status, 0);
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn notify_keeps_raw_body_when_json_is_broken() {
        let transport = FakeTransport::new(200, "{ not json }");
        let client = make_client(transport);

        let err = client.notify("hello").await.unwrap_err();
        assert_eq!(
            err.response_body(),
            Some(&ResponseBody::Raw("{ not json }".to_owned()))
        );
        match err {
            PushoverError::InvalidResponse { source, .. } => assert!(source.is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn notify_requires_json_content_type_for_success() {
        let transport = FakeTransport::new(200, r#"{"status":1}"#).content_type(Some("text/plain"));
        let client = make_client(transport);

        let err = client.notify("hello").await.unwrap_err();
        assert!(matches!(
            err,
            PushoverError::InvalidResponse {
                body: Some(ResponseBody::Raw(_)),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn notify_classifies_http_statuses() {
        let cases = [
            (429, "rate-limited"),
            (432, "invalid request"),
            (400, "invalid request"),
            (567, "internal server error"),
            (500, "internal server error"),
            (301, "unknown"),
            (204, "unknown"),
        ];

        for (status, expected) in cases {
            let transport = FakeTransport::new(status, r#"{"status":0,"request":"r"}"#);
            let client = make_client(transport);

            let err = client.notify("hello").await.unwrap_err();
            assert_eq!(err.to_string(), expected, "status {status}");
            assert!(err.response_body().is_some(), "status {status}");
        }
    }

    #[tokio::test]
    async fn notify_without_status_is_invalid_response() {
        let transport = FakeTransport::with_status(None, r#"{"status":1}"#);
        let client = make_client(transport);

        let err = client.notify("hello").await.unwrap_err();
        assert!(matches!(err, PushoverError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn notify_surfaces_service_errors() {
        let json = r#"
        {
          "user": "invalid",
          "errors": ["user identifier is not a valid user, group, or subscribed user key"],
          "status": 0,
          "request": "5042853c-402d-4a18-abcb-168734a801de"
        }
        "#;
        let transport = FakeTransport::new(400, json);
        let client = make_client(transport);

        let err = client.notify("hello").await.unwrap_err();
        assert!(matches!(
            err,
            PushoverError::InvalidRequest { status: 400, .. }
        ));
        assert_eq!(
            err.service_errors(),
            ["user identifier is not a valid user, group, or subscribed user key".to_owned()]
        );
        assert_eq!(
            err.response_body()
                .and_then(ResponseBody::as_message)
                .and_then(|message| message.user.as_deref()),
            Some("invalid")
        );
    }

    #[tokio::test]
    async fn notify_wraps_transport_failure() {
        let transport = FakeTransport::failing();
        let client = make_client(transport.clone());

        let err = client.notify("hello").await.unwrap_err();
        assert!(matches!(err, PushoverError::Transport(_)));
        assert_eq!(err.to_string(), "transport error: connection refused");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn one_shot_notify_validates_options_first() {
        let err = notify(ClientOptions::default(), "hello").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: client.token must not be empty\nclient.user_key must not be empty"
        );
    }

    #[test]
    fn classify_reports_body_read_errors_as_source() {
        let err = classify_response(
            Some(200),
            None,
            Some(TransportError::Body("reset".into())),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PushoverError::InvalidResponse {
                body: None,
                source: Some(_)
            }
        ));
    }

    #[test]
    fn builder_applies_options() {
        let client = PushoverClient::builder(ClientOptions::new("app", "usr"))
            .timeout(Duration::from_secs(5))
            .user_agent("monitor/2.0")
            .build()
            .unwrap();
        assert_eq!(client.base_endpoint(), DEFAULT_BASE_URL);
        assert_eq!(client.user_agent, "monitor/2.0");

        let client = PushoverClient::new(
            ClientOptions::new("app", "usr").base_url("http://127.0.0.1:8080/pushover/"),
        )
        .unwrap();
        assert_eq!(client.base_endpoint(), "http://127.0.0.1:8080/pushover");
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let err = PushoverClient::new(ClientOptions::new("app", "usr").base_url("nope"))
            .unwrap_err();
        assert!(matches!(
            err,
            PushoverError::Validation(ValidationError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let client = make_client(FakeTransport::new(200, ""));
        let rendered = format!("{client:?}");
        assert!(rendered.contains("https://example.invalid/1"));
        assert!(!rendered.contains("app_token"));
        assert!(!rendered.contains("user_key"));
    }
}
