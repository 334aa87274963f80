//! Rate-limited HTTP executor
//!
//! Wraps a reqwest client with the retry discipline every remote call in
//! this system needs: throttled (429) responses and transient transport
//! failures are retried after a fixed delay, everything else is returned to
//! the caller unmodified. The executor never interprets business errors.
//!
//! Retrying is safe here because every remote operation is either a
//! read-only GET or a mutation addressing absolute target state, so a
//! replayed request converges on the same result. The backoff policy is
//! injected and unbounded by default; tests and cautious callers bound it.

use std::time::Duration;

use priceloom_common::{BackoffPolicy, RetryDecision};
use priceloom_domain::{constants, PriceloomError, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// HTTP client with built-in throttle/transient retry support.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    throttle: BackoffPolicy,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Transient failures are logged with the request's method and URL so an
    /// operator can see which target is stalling. When a bounded policy runs
    /// out of attempts, the last throttled response (or transport error) is
    /// surfaced as-is.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let cloned_builder = builder.try_clone().ok_or_else(|| {
                PriceloomError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                PriceloomError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        warn!(attempt, %method, %url, "request throttled by remote");
                        match self.throttle.next(attempt) {
                            RetryDecision::RetryAfter(delay) => {
                                sleep_if_nonzero(delay).await;
                                continue;
                            }
                            RetryDecision::Stop => return Ok(response),
                        }
                    }

                    return Ok(response);
                }
                Err(err) => {
                    warn!(attempt, %method, %url, error = %err, "HTTP request failed");

                    if should_retry_error(&err) {
                        match self.throttle.next(attempt) {
                            RetryDecision::RetryAfter(delay) => {
                                sleep_if_nonzero(delay).await;
                                continue;
                            }
                            RetryDecision::Stop => {}
                        }
                    }

                    let infra: InfraError = err.into();
                    return Err(PriceloomError::from(infra));
                }
            }
        }
    }
}

async fn sleep_if_nonzero(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    throttle: BackoffPolicy,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            throttle: BackoffPolicy::unbounded(Duration::from_secs(
                constants::THROTTLE_RETRY_DELAY_SECS,
            )),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the throttle/transient retry policy.
    pub fn throttle_policy(mut self, policy: BackoffPolicy) -> Self {
        self.throttle = policy;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            PriceloomError::from(infra)
        })?;

        Ok(HttpClient { client, throttle: self.throttle })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_request() {
        return true;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with_fast_throttle(max_attempts: u32) -> HttpClient {
        HttpClient::builder()
            .throttle_policy(BackoffPolicy::bounded(Duration::from_millis(10), max_attempts))
            .build()
            .expect("http client")
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_fast_throttle(3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn retries_throttled_responses_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 2 {
                    ResponseTemplate::new(429)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let client = client_with_fast_throttle(5);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn bounded_policy_surfaces_last_throttled_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_with_fast_throttle(2);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn other_statuses_are_returned_unmodified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_fast_throttle(3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1, "business errors are not retried");
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_fast_throttle(3);
        let response = client
            .send(client.request(Method::POST, server.uri()).body("{}"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn retries_on_network_failure_then_surfaces_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{}", addr);

        let client = client_with_fast_throttle(2);
        let result = client.send(client.request(Method::GET, &url)).await;
        match result {
            Err(PriceloomError::Network(msg)) => {
                assert!(msg.to_lowercase().contains("http"));
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
