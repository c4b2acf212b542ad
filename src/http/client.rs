//! JSON HTTP client with interceptors and retry.

use anyhow::{Context, Result};
use log::debug;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::interceptor::{HttpResponse, RequestConfig, RequestInterceptor, ResponseInterceptor};
use super::retry::{HttpError, RetryPolicy, with_retry};

/// Per-request overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Merged over the client's default headers.
    pub headers: HeaderMap,
    /// Overrides the client's retry count for this request.
    pub retry: Option<u32>,
}

/// HTTP client that sends and receives JSON.
///
/// Relative URLs are resolved against the base URL. Requests go through the
/// registered request interceptors once, then are attempted according to the
/// retry policy: every failure except a 4xx response is retried with
/// exponential backoff.
///
/// Cookies are kept when the wrapped reqwest `Client` was built with a cookie
/// store.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    default_headers: HeaderMap,
    retry: RetryPolicy,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            base_url: base_url.into(),
            default_headers,
            retry: RetryPolicy::default(),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn add_request_interceptor(&mut self, interceptor: impl RequestInterceptor + 'static) {
        self.request_interceptors.push(Arc::new(interceptor));
    }

    pub fn add_response_interceptor(&mut self, interceptor: impl ResponseInterceptor + 'static) {
        self.response_interceptors.push(Arc::new(interceptor));
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request(Method::GET, url, None, &RequestOptions::default())
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        self.request(Method::POST, url, Some(body), &RequestOptions::default())
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        self.request(Method::PUT, url, Some(body), &RequestOptions::default())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request(Method::DELETE, url, None, &RequestOptions::default())
            .await
    }

    /// Sends a request with explicit options.
    ///
    /// Fails with a downcastable [`HttpError`] for non-2xx responses; other
    /// errors (connection, body parsing) come from the last attempt.
    #[tracing::instrument(skip(self, body, options))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> Result<T> {
        // An overridden header replaces every default value of that name
        let mut headers = self.default_headers.clone();
        for name in options.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in options.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        let mut config = RequestConfig {
            method,
            url: self.resolve_url(url),
            headers,
            body,
        };

        for interceptor in &self.request_interceptors {
            config = interceptor.on_request(config).await?;
        }

        let policy = match options.retry {
            Some(retries) => self.retry.with_max_retries(retries),
            None => self.retry,
        };

        let operation_name = format!("{} {}", config.method, config.url);
        debug!("{} (up to {} attempts)...", operation_name, policy.total_attempts());

        let config = &config;
        with_retry(&policy, &operation_name, || async move {
            self.send_once(config).await
        })
        .await
    }

    /// Single attempt without retry.
    async fn send_once<T: DeserializeOwned>(&self, config: &RequestConfig) -> Result<T> {
        let mut builder = self
            .client
            .request(config.method.clone(), &config.url)
            .headers(config.headers.clone());

        if let Some(body) = &config.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.context("Failed to send request")?;
        let mut response = HttpResponse::read(response).await?;

        for interceptor in &self.response_interceptors {
            response = interceptor.on_response(response).await?;
        }

        if !response.status.is_success() {
            return Err(HttpError::from_body(response.status, &response.body).into());
        }

        response.parse()
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn fast_client(base_url: &str, max_retries: u32) -> HttpClient {
        HttpClient::new(Client::new(), base_url).with_retry_policy(
            RetryPolicy::default()
                .with_max_retries(max_retries)
                .with_base_delay(Duration::from_millis(1)),
        )
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        let client = fast_client(&server.url(), 3);

        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct TestResponse {
            name: String,
            value: i32,
        }

        let result: TestResponse = client.get("/test").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_get_text_response() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/text")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("pong")
            .create_async()
            .await;

        let client = fast_client(&server.url(), 0);
        let result: String = client.get("/text").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, "pong");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/items")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"name": "widget"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 7}"#)
            .create_async()
            .await;

        let client = fast_client(&server.url(), 0);
        let result: Value = client.post("/items", &json!({"name": "widget"})).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result["id"], 7);
    }

    #[tokio::test]
    async fn test_put_and_delete() {
        let mut server = mockito::Server::new_async().await;

        let put = server
            .mock("PUT", "/items/7")
            .match_body(Matcher::Json(json!({"name": "gadget"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/items/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = fast_client(&server.url(), 0);
        let updated: Value = client.put("/items/7", &json!({"name": "gadget"})).await.unwrap();
        let deleted: Value = client.delete("/items/7").await.unwrap();

        put.assert_async().await;
        delete.assert_async().await;
        assert_eq!(updated["ok"], true);
        assert_eq!(deleted["ok"], true);
    }

    #[tokio::test]
    async fn test_absolute_url_bypasses_base_url() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/abs")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = fast_client("http://unused.invalid", 0);
        let _: Value = client.get(&format!("{}/abs", server.url())).await.unwrap();

        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn test_server_error_retries_max_retries_times() {
        let mut server = mockito::Server::new_async().await;

        // 1 attempt + 3 retries
        let mock = server
            .mock("GET", "/flaky")
            .with_status(500)
            .expect(4)
            .create_async()
            .await;

        let client = fast_client(&server.url(), 3);
        let err = client.get::<Value>("/flaky").await.unwrap_err();

        mock.assert_async().await;
        let http_error = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(http_error.status.as_u16(), 500);
        assert_eq!(http_error.message, "HTTP Error 500");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "error": "Invalid credentials", "message": "Wrong email or password"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = fast_client(&server.url(), 3);
        let err = client
            .post::<Value, _>("/auth/login", &json!({}))
            .await
            .unwrap_err();

        mock.assert_async().await;
        let http_error = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(http_error.status.as_u16(), 401);
        assert_eq!(http_error.message, "Wrong email or password");
        assert_eq!(
            http_error.data.as_ref().unwrap()["error"],
            "Invalid credentials"
        );
    }

    #[tokio::test]
    async fn test_request_options_override_retry_and_headers() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/flaky")
            .match_header("x-trace", "abc")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let client = fast_client(&server.url(), 5);
        let mut options = RequestOptions {
            retry: Some(1),
            ..Default::default()
        };
        options
            .headers
            .insert("x-trace", HeaderValue::from_static("abc"));

        let result = client
            .request::<Value>(Method::GET, "/flaky", None, &options)
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_request_options_keep_every_header_value() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let seen = Arc::new(Mutex::new(HeaderMap::new()));
        let seen_clone = Arc::clone(&seen);

        let mut client = fast_client(&server.url(), 0);
        client.add_request_interceptor(move |config: RequestConfig| {
            *seen_clone.lock().unwrap() = config.headers.clone();
            Ok::<_, anyhow::Error>(config)
        });

        let mut options = RequestOptions::default();
        options
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.api+json"));
        options.headers.append("x-tag", HeaderValue::from_static("a"));
        options.headers.append("x-tag", HeaderValue::from_static("b"));

        client
            .request::<Value>(Method::GET, "/tags", None, &options)
            .await
            .unwrap();

        let headers = seen.lock().unwrap();
        let content_types: Vec<_> = headers.get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(content_types, vec!["application/vnd.api+json"]);
        let tags: Vec<_> = headers.get_all("x-tag").iter().collect();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_request_interceptor_runs_once() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/flaky")
            .match_header("authorization", "Bearer t0k3n")
            .with_status(502)
            .expect(3)
            .create_async()
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let mut client = fast_client(&server.url(), 2);
        client.add_request_interceptor(move |mut config: RequestConfig| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            config.headers.insert(
                reqwest::header::AUTHORIZATION,
                HeaderValue::from_static("Bearer t0k3n"),
            );
            Ok::<_, anyhow::Error>(config)
        });

        let result = client.get::<Value>("/flaky").await;

        mock.assert_async().await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_response_interceptors_run_per_attempt_in_order() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/flaky")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut client = fast_client(&server.url(), 2);
        for label in ["first", "second"] {
            let seen = Arc::clone(&seen);
            client.add_response_interceptor(move |response: HttpResponse| {
                seen.lock().unwrap().push(label);
                Ok::<_, anyhow::Error>(response)
            });
        }

        let _ = client.get::<Value>("/flaky").await;

        mock.assert_async().await;
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first", "second", "first", "second", "first", "second"]
        );
    }

    #[tokio::test]
    async fn test_response_interceptor_can_rescue_response() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/maintenance")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(r#"{"cached": true}"#)
            .expect(1)
            .create_async()
            .await;

        let mut client = fast_client(&server.url(), 3);
        client.add_response_interceptor(|mut response: HttpResponse| {
            response.status = reqwest::StatusCode::OK;
            Ok::<_, anyhow::Error>(response)
        });

        let result: Value = client.get("/maintenance").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result["cached"], true);
    }

    #[test_log::test(tokio::test)]
    async fn test_connection_error_is_retried() {
        // Nothing listens on port 1
        let client = fast_client("http://127.0.0.1:1", 2);
        let err = client.get::<Value>("/").await.unwrap_err();

        assert!(err.downcast_ref::<HttpError>().is_none());
        assert!(crate::http::is_network_error(&err));
    }
}
