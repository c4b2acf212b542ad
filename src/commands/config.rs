use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    http::{BACKOFF_BASE_MS, DEFAULT_MAX_RETRIES, HttpClient, RetryPolicy},
    infrastructure::{BearerTokenInterceptor, FileTokenStorage, HttpAuthService},
    runtime::Runtime,
};

pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Options that shape the API connection.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(BACKOFF_BASE_MS),
        }
    }
}

pub struct Config<R: Runtime> {
    pub storage: Arc<FileTokenStorage<R>>,
    pub auth: Arc<HttpAuthService>,
}

impl<R: Runtime + 'static> Config<R> {
    pub fn new(runtime: R, settings: &Settings) -> Result<Self> {
        let storage = FileTokenStorage::new(runtime)?;
        Self::with_storage(storage, settings)
    }

    pub fn with_storage(storage: FileTokenStorage<R>, settings: &Settings) -> Result<Self> {
        let storage = Arc::new(storage);

        let client = Client::builder()
            .user_agent("authflow-cli")
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = settings.api_url.trim_end_matches('/');
        debug!(
            "Using API at {} ({} retries, {}ms backoff)",
            base_url,
            settings.retries,
            settings.backoff.as_millis()
        );

        let mut http = HttpClient::new(client, base_url).with_retry_policy(
            RetryPolicy::default()
                .with_max_retries(settings.retries)
                .with_base_delay(settings.backoff),
        );
        http.add_request_interceptor(BearerTokenInterceptor::new(storage.clone()));

        let auth = Arc::new(HttpAuthService::new(http, storage.clone()));

        Ok(Self { storage, auth })
    }
}
