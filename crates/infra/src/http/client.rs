//! Outbound HTTP for provider and statistics calls.
//!
//! Retries transient failures (connect errors, timeouts, 5xx, 429) with
//! exponential backoff and decodes JSON or text bodies into [`FetchError`]
//! so each caller can map failures into its own error vocabulary.

use std::time::Duration;

use influlink_domain::InfluLinkError;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::InfraError;

/// Longest response body excerpt kept in errors and logs.
const BODY_EXCERPT_LEN: usize = 256;

/// Why a fetch did not produce a usable body.
#[derive(Debug)]
pub enum FetchError {
    /// Request never completed (connect, timeout, TLS).
    Transport(InfluLinkError),
    /// Server answered with a non-success status.
    Status { status: StatusCode, body: String },
    /// Body did not match the expected shape.
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "{err}"),
            Self::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            Self::Decode(msg) => write!(f, "unexpected response body: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// HTTP client with built-in retry and timeout support.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, InfluLinkError> {
        Self::builder().build()
    }

    /// Underlying reqwest client, shared with the OAuth token client.
    pub fn inner(&self) -> &ReqwestClient {
        &self.client
    }

    pub fn get<U>(&self, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.get(url)
    }

    /// Execute the provided request builder with retry semantics.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, InfluLinkError> {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let request = builder
                .try_clone()
                .ok_or_else(|| InfluLinkError::Internal("streaming request bodies cannot be retried".into()))?
                .build()
                .map_err(|err| InfluLinkError::from(InfraError::from(err)))?;

            let method = request.method().clone();
            // Query strings may carry API keys.
            let path = request.url().path().to_string();
            let host = request.url().host_str().unwrap_or_default().to_string();

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %host, %path, %status, "HTTP response");

                    if is_retryable_status(status) && attempt < attempts {
                        self.backoff(attempt).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt, %method, %host, %path, error = %err, "HTTP request failed");
                    let retryable = err.is_timeout() || err.is_connect() || err.is_request();
                    last_error = Some(InfluLinkError::from(InfraError::from(err)));

                    if retryable && attempt < attempts {
                        self.backoff(attempt).await;
                        continue;
                    }
                    break;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| InfluLinkError::Internal("HTTP retries exhausted".into())))
    }

    /// Send and decode a JSON body from a successful response.
    pub async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, FetchError> {
        let body = self.fetch_text(builder).await?;
        serde_json::from_str(&body).map_err(|err| FetchError::Decode(err.to_string()))
    }

    /// Send and read the body of a successful response.
    pub async fn fetch_text(&self, builder: RequestBuilder) -> Result<String, FetchError> {
        let response = self.send(builder).await.map_err(FetchError::Transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Transport(InfraError::from(err).into()))?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: excerpt(&body) });
        }
        Ok(body)
    }

    async fn backoff(&self, attempt: usize) {
        let shift = u32::try_from(attempt.saturating_sub(1).min(8)).unwrap_or(8);
        let delay = self.base_backoff.saturating_mul(1u32 << shift);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 2,
            base_backoff: Duration::from_millis(200),
            user_agent: concat!("influlink/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient, InfluLinkError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(|err| InfluLinkError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with_defaults() -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(10))
            .max_attempts(3)
            .build()
            .expect("http client")
    }

    #[derive(Debug, Deserialize)]
    struct Channel {
        id: String,
    }

    #[tokio::test]
    async fn retries_transient_statuses_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                match attempts_clone.fetch_add(1, Ordering::SeqCst) {
                    0 => ResponseTemplate::new(503),
                    1 => ResponseTemplate::new(429),
                    _ => ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "UC1"})),
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let channel: Channel = client.fetch_json(client.get(server.uri())).await.expect("json");

        assert_eq!(channel.id, "UC1");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried_and_keep_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such channel"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let err = client
            .fetch_text(client.get(format!("{}/missing", server.uri())))
            .await
            .expect_err("404");

        assert!(matches!(err, FetchError::Status { status: StatusCode::NOT_FOUND, .. }));
        assert!(err.to_string().contains("no such channel"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let result: Result<Channel, _> = client.fetch_json(client.get(server.uri())).await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn connection_failures_surface_as_network_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = HttpClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(2)
            .build()
            .expect("http client");

        let result = client.send(client.get(format!("http://{addr}"))).await;
        match result {
            Err(InfluLinkError::Network(msg)) => assert!(msg.to_lowercase().contains("http")),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(BODY_EXCERPT_LEN * 2);
        assert_eq!(excerpt(&body).chars().count(), BODY_EXCERPT_LEN + 1);
        assert_eq!(excerpt("short"), "short");
    }
}
