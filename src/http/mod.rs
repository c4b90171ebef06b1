//! HTTP client module
//!
//! Provides the admin API client and its request/response pipeline.
//!
//! # Features
//!
//! - **Authentication**: Bearer token injected from the session store
//! - **Rate-limit retry**: 429 responses retried once per request with
//!   `Retry-After` or exponential backoff, bounded by a shared retry ledger
//! - **Session expiry**: 401 clears the token and redirects to the login page
//! - **Pacing**: Optional token bucket limiter using governor

mod client;
mod interceptor;
mod rate_limit;
mod request;
mod response;
mod retry;

pub use client::{
    ApiClient, ApiClientConfig, ApiClientConfigBuilder, SESSION_EXPIRED_MESSAGE,
    TOO_MANY_REQUESTS_MESSAGE,
};
pub use interceptor::{BearerAuth, RequestInterceptor};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use request::{ApiRequest, FilePart, RequestBody};
pub use response::{read_list, server_message, ApiResponse};
pub use retry::{backoff_delay, parse_retry_after, RetryKey, RetryLedger};
