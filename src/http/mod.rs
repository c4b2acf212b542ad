//! HTTP client module with interceptors, retry logic and error handling.

mod client;
mod interceptor;
mod retry;

pub use client::{HttpClient, RequestOptions};
pub use interceptor::{HttpResponse, RequestConfig, RequestInterceptor, ResponseInterceptor};
pub use retry::{
    BACKOFF_BASE_MS, DEFAULT_MAX_RETRIES, HttpError, RetryPolicy, is_network_error, is_retryable,
    with_retry,
};
