//! Service interfaces the use cases depend on.
//!
//! Infrastructure provides the implementations; tests use the generated
//! mocks.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{AuthResult, Credentials, OAuthProvider, StoredSession, User, UserInfo};

/// Remote authentication service.
///
/// `login`, `signup` and `refresh` report rejections as an unsuccessful
/// [`AuthResult`]; `Err` is reserved for unexpected failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResult>;

    async fn signup(&self, user: &User) -> Result<AuthResult>;

    /// URL to redirect the user to for the given provider.
    async fn oauth_url(&self, provider: OAuthProvider) -> Result<String>;

    /// The user behind the currently stored token.
    async fn current_user(&self) -> Result<UserInfo>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthResult>;

    fn is_authenticated(&self) -> bool;

    async fn logout(&self) -> Result<()>;
}

/// Token persistence, keyed by the remember-me flag.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStorage: Send + Sync {
    fn save_token(&self, session: &StoredSession) -> Result<()>;

    /// The stored session, preferring the persistent scope.
    fn load(&self) -> Result<Option<StoredSession>>;

    fn token(&self) -> Option<String>;

    /// Clears both scopes.
    fn remove_token(&self) -> Result<()>;

    /// Whether the stored token is a JWT that has not expired yet.
    fn is_token_valid(&self) -> bool;
}
