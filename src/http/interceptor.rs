//! Request/response interceptors.
//!
//! Request interceptors see the fully assembled request once, before the
//! first attempt. Response interceptors see every attempt's response before
//! its status is checked. Both run in registration order and may rewrite what
//! they are given or abort with an error.
//!
//! Plain closures work as interceptors:
//!
//! ```no_run
//! # use authflow::http::{HttpClient, RequestConfig};
//! # use reqwest::header::HeaderValue;
//! # let mut client = HttpClient::new(reqwest::Client::new(), "http://localhost:4000");
//! client.add_request_interceptor(|mut config: RequestConfig| {
//!     config.headers.insert("x-request-source", HeaderValue::from_static("cli"));
//!     Ok::<_, anyhow::Error>(config)
//! });
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A request as it will be sent.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?
            .to_vec();

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    pub fn is_json(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// JSON bodies are parsed as JSON, anything else is handed to the target
    /// type as a JSON string.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        if self.is_json() {
            serde_json::from_slice(&self.body).context("Failed to parse JSON response")
        } else {
            serde_json::from_value(Value::String(self.text()))
                .context("Failed to convert text response")
        }
    }
}

#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn on_request(&self, config: RequestConfig) -> Result<RequestConfig>;
}

#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_response(&self, response: HttpResponse) -> Result<HttpResponse>;
}

#[async_trait]
impl<F> RequestInterceptor for F
where
    F: Fn(RequestConfig) -> Result<RequestConfig> + Send + Sync,
{
    async fn on_request(&self, config: RequestConfig) -> Result<RequestConfig> {
        self(config)
    }
}

#[async_trait]
impl<F> ResponseInterceptor for F
where
    F: Fn(HttpResponse) -> Result<HttpResponse> + Send + Sync,
{
    async fn on_response(&self, response: HttpResponse) -> Result<HttpResponse> {
        self(response)
    }
}
