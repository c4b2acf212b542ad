//! Request interceptor that authenticates requests with the stored token.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::sync::Arc;

use crate::application::TokenStorage;
use crate::http::{RequestConfig, RequestInterceptor};

/// Adds `Authorization: Bearer <token>` when a token is stored and the request
/// does not already carry an authorization header.
pub struct BearerTokenInterceptor {
    storage: Arc<dyn TokenStorage>,
}

impl BearerTokenInterceptor {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl RequestInterceptor for BearerTokenInterceptor {
    async fn on_request(&self, mut config: RequestConfig) -> Result<RequestConfig> {
        if config.headers.contains_key(AUTHORIZATION) {
            return Ok(config);
        }

        if let Some(token) = self.storage.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Stored token is not a valid header value")?;
            value.set_sensitive(true);
            config.headers.insert(AUTHORIZATION, value);
        }

        Ok(config)
    }
}
