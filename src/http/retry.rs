//! Retry bookkeeping for rate-limited requests
//!
//! The ledger counts how many times a (path, method) pair has been retried
//! after a 429. It is shared by every request sent through one client, so
//! concurrent requests to the same endpoint share a counter.

use super::request::ApiRequest;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Key identifying an endpoint in the retry ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetryKey {
    path: String,
    method: &'static str,
}

impl RetryKey {
    pub fn new(path: impl Into<String>, method: crate::types::Method) -> Self {
        Self {
            path: path.into(),
            method: method.as_str(),
        }
    }

    /// Key for a request
    pub fn for_request(request: &ApiRequest) -> Self {
        Self::new(request.path.clone(), request.method)
    }
}

impl fmt::Display for RetryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.path, self.method)
    }
}

/// Shared retry counters
#[derive(Debug, Clone, Default)]
pub struct RetryLedger {
    counts: Arc<Mutex<HashMap<RetryKey, u32>>>,
}

impl RetryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current retry count for `key` (0 if absent)
    pub fn count(&self, key: &RetryKey) -> u32 {
        self.lock().get(key).copied().unwrap_or(0)
    }

    /// Increment the count for `key`, returning the new value
    pub fn increment(&self, key: &RetryKey) -> u32 {
        let mut counts = self.lock();
        let count = counts.entry(key.clone()).or_insert(0);
        *count += 1;
        *count
    }

    /// Forget `key`
    pub fn clear(&self, key: &RetryKey) {
        self.lock().remove(key);
    }

    /// Number of endpoints currently tracked
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RetryKey, u32>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exponential backoff: `initial * 2^retry_count`, capped at `max`
pub fn backoff_delay(retry_count: u32, initial: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(retry_count);
    std::cmp::min(initial.saturating_mul(factor), max)
}

/// Parse a `Retry-After` header given in whole seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
