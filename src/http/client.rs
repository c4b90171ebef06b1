//! Admin API client
//!
//! Single point of outbound communication for the dashboard. Every request:
//! - runs the request interceptors (bearer token injection first)
//! - is dispatched against the configured base URL with JSON defaults
//! - has its response classified: 2xx returned, 429 retried with backoff,
//!   401 ends the session, anything else is propagated

use super::interceptor::{BearerAuth, RequestInterceptor};
use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::request::{ApiRequest, FilePart, RequestBody};
use super::response::{read_list, server_message, status_error, ApiResponse};
use super::retry::{backoff_delay, parse_retry_after, RetryKey, RetryLedger};
use crate::error::{Error, Result};
use crate::session::{MemoryNavigator, MemoryTokenStore, Navigator, TokenStore};
use crate::types::{JsonValue, StringMap};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Message surfaced when a rate-limited request cannot be retried
pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests. Please try again later.";

/// Message surfaced when the server rejects the session without a message
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL all request paths are resolved against
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retry budget per endpoint for rate-limited requests
    pub max_retries: u32,
    /// Backoff for the first retry when no Retry-After is sent
    pub initial_backoff: Duration,
    /// Upper bound for computed backoff
    pub max_backoff: Duration,
    /// Optional client-side pacing
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
    /// Route the user is sent to when the session expires
    pub login_path: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        let mut default_headers = StringMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(5000),
            rate_limit: None,
            default_headers,
            user_agent: format!("content-admin/{}", env!("CARGO_PKG_VERSION")),
            login_path: "/login".to_string(),
        }
    }
}

impl ApiClientConfig {
    /// Create a new config builder
    pub fn builder() -> ApiClientConfigBuilder {
        ApiClientConfigBuilder::default()
    }
}

/// Builder for API client config
#[derive(Default)]
pub struct ApiClientConfigBuilder {
    config: ApiClientConfig,
}

impl ApiClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries for rate-limited requests
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff bounds
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Enable client-side pacing
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the login route
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ApiClientConfig {
        self.config
    }
}

/// HTTP client for the admin API
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
    ledger: RetryLedger,
    rate_limiter: Option<RateLimiter>,
}

impl ApiClient {
    /// Create a client with its session collaborators
    pub fn new(
        config: ApiClientConfig,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);
        let interceptors: Vec<Arc<dyn RequestInterceptor>> =
            vec![Arc::new(BearerAuth::new(Arc::clone(&tokens)))];

        Ok(Self {
            client,
            config,
            tokens,
            navigator,
            interceptors,
            ledger: RetryLedger::new(),
            rate_limiter,
        })
    }

    /// Create a client with an in-memory token store and navigator
    pub fn with_config(config: ApiClientConfig) -> Result<Self> {
        Self::new(
            config,
            Arc::new(MemoryTokenStore::new()),
            Arc::new(MemoryNavigator::default()),
        )
    }

    /// Register an interceptor to run after the built-in ones
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Session token storage
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Retry counters for rate-limited endpoints
    pub fn ledger(&self) -> &RetryLedger {
        &self.ledger
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    /// Make a POST request with a JSON body
    pub async fn post(&self, path: &str, body: JsonValue) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path, body)).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, path: &str, body: JsonValue) -> Result<ApiResponse> {
        self.send(ApiRequest::put(path, body)).await
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch(&self, path: &str, body: JsonValue) -> Result<ApiResponse> {
        self.send(ApiRequest::patch(path, body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Upload a single file as a multipart form
    pub async fn upload(&self, path: &str, file: FilePart) -> Result<ApiResponse> {
        self.send(ApiRequest::upload(path, file)).await
    }

    /// Send a request and parse the JSON response
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.send(request).await?.json()
    }

    /// Make a GET request and parse the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// Make a GET request and read the body as a list
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let body = self.get(path).await?.value()?;
        Ok(read_list(&body))
    }

    /// Send a request through the interceptor pipeline
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut request = request;
        let mut retry_key: Option<RetryKey> = None;

        let outcome = loop {
            if let Err(e) = self.prepare(&mut request).await {
                break Err(e);
            }

            // Network failures propagate as-is
            let response = match self.dispatch(&request).await {
                Ok(response) => response,
                Err(e) => break Err(e),
            };

            let status = response.status();
            let headers = response.headers().clone();
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) => break Err(Error::Http(e)),
            };

            if status.is_success() {
                debug!("{} {} -> {}", request.method, request.path, status.as_u16());
                break Ok(ApiResponse::new(status, headers, body));
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    let key = RetryKey::for_request(&request);
                    let count = self.ledger.count(&key);

                    if count < self.config.max_retries && !request.is_retried() {
                        request.mark_retried();
                        self.ledger.increment(&key);

                        let delay = retry_after(&headers).unwrap_or_else(|| {
                            backoff_delay(count, self.config.initial_backoff, self.config.max_backoff)
                        });
                        warn!(
                            "Rate limited (429) on {} {}, retry {}/{} in {:?}",
                            request.method,
                            request.path,
                            count + 1,
                            self.config.max_retries,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        retry_key = Some(key);
                        continue;
                    }

                    self.ledger.clear(&key);
                    warn!(
                        "Rate limited (429) on {} {}, not retrying",
                        request.method, request.path
                    );
                    break Err(Error::RateLimited {
                        message: server_message(&body),
                    });
                }
                StatusCode::UNAUTHORIZED => break Err(self.expire_session(&body).await),
                _ => {
                    debug!("{} {} -> {}", request.method, request.path, status.as_u16());
                    break Err(status_error(status, &body));
                }
            }
        };

        if let Some(key) = retry_key {
            self.ledger.clear(&key);
        }
        outcome
    }

    /// Run the interceptors over a request
    async fn prepare(&self, request: &mut ApiRequest) -> Result<()> {
        for interceptor in &self.interceptors {
            interceptor.intercept(request).await?;
        }
        Ok(())
    }

    /// Build and send one HTTP request
    async fn dispatch(&self, request: &ApiRequest) -> Result<Response> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let url = self.build_url(&request.path);
        let mut headers = self.header_map(&request.headers)?;

        let mut req = self.client.request(request.method.into(), &url);

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        req = match &request.body {
            RequestBody::Empty => req.headers(headers),
            RequestBody::Json(body) => req.headers(headers).json(body),
            RequestBody::Multipart(file) => {
                // The multipart builder sets its own content type with the boundary
                headers.remove(CONTENT_TYPE);
                req.headers(headers).multipart(file.to_form()?)
            }
        };

        Ok(req.send().await?)
    }

    /// Merge default and per-request headers, the latter winning
    fn header_map(&self, overrides: &StringMap) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in self.config.default_headers.iter().chain(overrides) {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::Other(format!("Invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Other(format!("Invalid value for header '{key}': {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Clear the session and send the user to the login page
    async fn expire_session(&self, body: &Bytes) -> Error {
        if let Err(e) = self.tokens.clear().await {
            warn!("Failed to clear session token: {e}");
        }

        let login = self.config.login_path.as_str();
        if self.navigator.current_location() != login {
            info!("Session rejected by server, redirecting to {}", login);
            self.navigator.redirect(login);
        }

        Error::Unauthorized {
            message: server_message(body),
        }
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("interceptors", &self.interceptors.len())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Delay requested by the server through `Retry-After`
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}
