//! [`AuthService`] over the JSON auth API.
//!
//! Every endpoint answers with a `{success, data, error, message}` envelope.
//! Rejections (4xx responses or `success: false`) come back as unsuccessful
//! [`AuthResult`]s for login, signup and refresh.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{AuthService, TokenStorage};
use crate::domain::{AuthResult, Credentials, OAuthProvider, User, UserInfo};
use crate::http::{HttpClient, HttpError, is_network_error};

const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";
const ME_PATH: &str = "/auth/me";
const REFRESH_PATH: &str = "/auth/refresh";

const LOGIN_FAILED: &str = "Login failed";
const SIGNUP_FAILED: &str = "Registration failed";
const REFRESH_FAILED: &str = "Session refresh failed";
const NETWORK_ERROR: &str = "Network error. Check your connection.";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<String>,
    message: Option<String>,
}

impl<T> Envelope<T> {
    /// The payload of a successful response, or the server's explanation.
    fn into_data(self) -> Result<T, String> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(self.error.or(self.message).unwrap_or_default()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    token: String,
    refresh_token: Option<String>,
    user: Option<UserInfo>,
}

#[derive(Debug, Deserialize)]
struct OAuthPayload {
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

fn session_result(envelope: Envelope<SessionPayload>, fallback: &str) -> AuthResult {
    match envelope.into_data() {
        Ok(payload) => AuthResult::succeeded(payload.token, payload.refresh_token, payload.user),
        Err(message) if message.is_empty() => AuthResult::failed(fallback),
        Err(message) => AuthResult::failed(message),
    }
}

/// Turns an HTTP rejection into an unsuccessful result; every other error is
/// passed through.
fn rejection(e: anyhow::Error) -> Result<AuthResult> {
    match e.downcast_ref::<HttpError>() {
        Some(http_error) => {
            debug!("Request rejected: {}", http_error);
            Ok(AuthResult::failed(http_error.message.clone()))
        }
        None => Err(e),
    }
}

pub struct HttpAuthService {
    http: HttpClient,
    storage: Arc<dyn TokenStorage>,
}

impl HttpAuthService {
    pub fn new(http: HttpClient, storage: Arc<dyn TokenStorage>) -> Self {
        Self { http, storage }
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    #[tracing::instrument(skip(self, credentials))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthResult> {
        match self
            .http
            .post::<Envelope<SessionPayload>, _>(LOGIN_PATH, &credentials.to_request())
            .await
        {
            Ok(envelope) => Ok(session_result(envelope, LOGIN_FAILED)),
            Err(e) => rejection(e),
        }
    }

    #[tracing::instrument(skip(self, user))]
    async fn signup(&self, user: &User) -> Result<AuthResult> {
        match self
            .http
            .post::<Envelope<SessionPayload>, _>(SIGNUP_PATH, &user.to_request())
            .await
        {
            Ok(envelope) => Ok(session_result(envelope, SIGNUP_FAILED)),
            Err(e) if is_network_error(&e) => {
                warn!("Signup could not reach the server: {:#}", e);
                Ok(AuthResult::failed(NETWORK_ERROR))
            }
            Err(e) => rejection(e),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn oauth_url(&self, provider: OAuthProvider) -> Result<String> {
        let envelope: Envelope<OAuthPayload> =
            self.http.get(&format!("/auth/oauth/{}", provider)).await?;

        envelope
            .into_data()
            .map(|payload| payload.url)
            .map_err(|message| anyhow!("No {} redirect URL: {}", provider, message))
    }

    #[tracing::instrument(skip(self))]
    async fn current_user(&self) -> Result<UserInfo> {
        let envelope: Envelope<UserInfo> = self.http.get(ME_PATH).await?;

        envelope
            .into_data()
            .map_err(|message| anyhow!("Current user unavailable: {}", message))
    }

    #[tracing::instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResult> {
        match self
            .http
            .post::<Envelope<SessionPayload>, _>(REFRESH_PATH, &RefreshRequest { refresh_token })
            .await
        {
            Ok(envelope) => Ok(session_result(envelope, REFRESH_FAILED)),
            Err(e) => rejection(e),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.storage.is_token_valid()
    }

    async fn logout(&self) -> Result<()> {
        self.storage.remove_token()
    }
}
