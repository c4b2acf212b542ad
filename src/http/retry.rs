//! Retry policy with exponential backoff and error classification.

use anyhow::{Result, anyhow};
use log::{debug, warn};
use reqwest::StatusCode;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Backoff unit: attempt `n` (counted from 0) waits `2^n` of these.
pub const BACKOFF_BASE_MS: u64 = 1000;

/// How many times a request is retried and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero means a single attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(BACKOFF_BASE_MS),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self
        }
    }

    pub fn with_base_delay(self, base_delay: Duration) -> Self {
        Self { base_delay, ..self }
    }

    /// Total attempts including the first one. Always at least 1.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after the failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// A response with a non-success status code.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    /// The body's `message` field, or `HTTP Error <status>`.
    pub message: String,
    /// Parsed JSON body, if the server sent one.
    pub data: Option<Value>,
}

impl HttpError {
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let data = serde_json::from_slice::<Value>(body).ok();
        let message = data
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP Error {}", status.as_u16()));

        Self {
            status,
            message,
            data,
        }
    }

    /// 4xx responses will not succeed on retry.
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HttpError {}

/// Everything is retried except 4xx responses.
pub fn is_retryable(e: &anyhow::Error) -> bool {
    match e.downcast_ref::<HttpError>() {
        Some(http_error) => !http_error.is_client_error(),
        None => true,
    }
}

/// Whether the request never reached the server (DNS, refused, timeout).
pub fn is_network_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<reqwest::Error>()
        .is_some_and(|err| err.is_connect() || err.is_timeout() || err.is_request())
}

/// Executes an async operation, retrying with exponential backoff until it
/// succeeds, fails with a non-retryable error, or runs out of attempts.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation_name: &str, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let total_attempts = policy.total_attempts();
    let mut last_error = None;

    for attempt in 0..total_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_retryable(&e) {
                    debug!("{}: non-retryable error: {}", operation_name, e);
                    return Err(e);
                }

                if attempt + 1 < total_attempts {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                        operation_name,
                        attempt + 1,
                        total_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        anyhow!("{}: failed after {} attempts", operation_name, total_attempts)
    }))
}
