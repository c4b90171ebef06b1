//! Request interceptors
//!
//! Interceptors run on every outgoing request, in registration order, right
//! before dispatch (including the re-dispatch of a rate-limited request).

use super::request::ApiRequest;
use crate::error::Result;
use crate::session::TokenStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// A stage run on every outgoing request
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn intercept(&self, request: &mut ApiRequest) -> Result<()>;
}

/// Attaches `Authorization: Bearer <token>` when a session token is stored
pub struct BearerAuth {
    tokens: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl RequestInterceptor for BearerAuth {
    async fn intercept(&self, request: &mut ApiRequest) -> Result<()> {
        match self.tokens.load().await? {
            Some(token) => {
                request
                    .headers
                    .retain(|key, _| !key.eq_ignore_ascii_case("authorization"));
                request
                    .headers
                    .insert("Authorization".to_string(), format!("Bearer {token}"));
            }
            None => debug!("No session token, sending {} unauthenticated", request.path),
        }
        Ok(())
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").finish_non_exhaustive()
    }
}
