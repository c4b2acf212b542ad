//! Session use cases - current user, token refresh and logout.

use log::{debug, error, info};
use std::sync::Arc;

use super::ports::{AuthService, TokenStorage};
use crate::domain::{AuthResult, Failure, Outcome, StoredSession, UserInfo};
use crate::http::HttpError;

const NOT_AUTHENTICATED: &str = "Not authenticated";
const NO_REFRESH_TOKEN: &str = "No refresh token available";
const CURRENT_USER_ERROR: &str = "Unable to load the current user. Please try again later.";
const REFRESH_REJECTED: &str = "Session refresh failed";
const REFRESH_ERROR: &str = "Session refresh failed. Please try again later.";
const STORAGE_ERROR: &str = "Unable to store the session";
const LOGOUT_ERROR: &str = "Logout failed";

/// Loads the user behind the stored token.
pub struct CurrentUserUseCase {
    auth_service: Arc<dyn AuthService>,
    storage: Arc<dyn TokenStorage>,
}

impl CurrentUserUseCase {
    pub fn new(auth_service: Arc<dyn AuthService>, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            auth_service,
            storage,
        }
    }

    /// Fails without a request when no token is stored. A rejection by the
    /// server surfaces its message; anything else becomes a generic one.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self) -> Outcome<UserInfo> {
        if self.storage.token().is_none() {
            return Err(Failure::new(NOT_AUTHENTICATED));
        }

        self.auth_service.current_user().await.map_err(|e| {
            if let Some(http_error) = e.downcast_ref::<HttpError>() {
                debug!("Current user rejected: {}", http_error);
                Failure::new(http_error.message.clone())
            } else {
                error!("Current user request failed: {:#}", e);
                Failure::new(CURRENT_USER_ERROR)
            }
        })
    }
}

/// Exchanges the stored refresh token for a new access token.
pub struct RefreshSessionUseCase {
    auth_service: Arc<dyn AuthService>,
    storage: Arc<dyn TokenStorage>,
}

impl RefreshSessionUseCase {
    pub fn new(auth_service: Arc<dyn AuthService>, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            auth_service,
            storage,
        }
    }

    /// The new token is stored in the same scope as the old one. The old
    /// refresh token is kept when the server does not rotate it.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self) -> Outcome<AuthResult> {
        let session = match self.storage.load() {
            Ok(Some(session)) => session,
            Ok(None) => return Err(Failure::new(NOT_AUTHENTICATED)),
            Err(e) => {
                error!("Failed to load stored session: {:#}", e);
                return Err(Failure::new(NOT_AUTHENTICATED));
            }
        };

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            return Err(Failure::new(NO_REFRESH_TOKEN));
        };

        let result = match self.auth_service.refresh(refresh_token).await {
            Ok(result) if result.success => result,
            Ok(result) => {
                return Err(Failure::new(
                    result.error.unwrap_or_else(|| REFRESH_REJECTED.to_string()),
                ));
            }
            Err(e) => {
                error!("Refresh request failed: {:#}", e);
                return Err(Failure::new(REFRESH_ERROR));
            }
        };

        let Some(token) = result.token.clone() else {
            return Err(Failure::new(REFRESH_REJECTED));
        };

        let refreshed = StoredSession {
            token,
            refresh_token: result.refresh_token.clone().or(session.refresh_token.clone()),
            remember: session.remember,
        };

        self.storage.save_token(&refreshed).map_err(|e| {
            error!("Failed to store refreshed session: {:#}", e);
            Failure::new(STORAGE_ERROR)
        })?;

        info!("Session refreshed");
        Ok(result)
    }
}

/// Clears the stored session.
pub struct LogoutUseCase {
    auth_service: Arc<dyn AuthService>,
}

impl LogoutUseCase {
    pub fn new(auth_service: Arc<dyn AuthService>) -> Self {
        Self { auth_service }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self) -> Outcome<()> {
        self.auth_service.logout().await.map_err(|e| {
            error!("Logout failed: {:#}", e);
            Failure::new(LOGOUT_ERROR)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockAuthService, MockTokenStorage};
    use mockall::predicate::eq;
    use reqwest::StatusCode;

    fn stored(refresh_token: Option<&str>, remember: bool) -> StoredSession {
        StoredSession {
            token: "old-token".into(),
            refresh_token: refresh_token.map(String::from),
            remember,
        }
    }

    #[tokio::test]
    async fn test_current_user_requires_token() {
        let mut service = MockAuthService::new();
        service.expect_current_user().never();
        let mut storage = MockTokenStorage::new();
        storage.expect_token().returning(|| None);

        let failure = CurrentUserUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap_err();

        assert_eq!(failure.message(), NOT_AUTHENTICATED);
    }

    #[tokio::test]
    async fn test_current_user_success() {
        let mut service = MockAuthService::new();
        service.expect_current_user().returning(|| {
            Ok(UserInfo {
                id: "2".into(),
                email: "user@example.com".into(),
                name: "Regular User".into(),
                role: Some("USER".into()),
                permissions: vec!["order:create".into()],
            })
        });
        let mut storage = MockTokenStorage::new();
        storage
            .expect_token()
            .returning(|| Some("mock-jwt-token-user".into()));

        let user = CurrentUserUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap();

        assert_eq!(user.id, "2");
        assert_eq!(user.permissions, vec!["order:create"]);
    }

    #[tokio::test]
    async fn test_current_user_rejected_token() {
        let mut service = MockAuthService::new();
        service.expect_current_user().returning(|| {
            Err(HttpError::from_body(
                StatusCode::UNAUTHORIZED,
                br#"{"success": false, "message": "The token is invalid or expired"}"#,
            )
            .into())
        });
        let mut storage = MockTokenStorage::new();
        storage.expect_token().returning(|| Some("bogus".into()));

        let failure = CurrentUserUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap_err();

        assert_eq!(failure.message(), "The token is invalid or expired");
    }

    #[tokio::test]
    async fn test_current_user_unexpected_error() {
        let mut service = MockAuthService::new();
        service
            .expect_current_user()
            .returning(|| Err(anyhow::anyhow!("connection reset")));
        let mut storage = MockTokenStorage::new();
        storage.expect_token().returning(|| Some("t".into()));

        let failure = CurrentUserUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap_err();

        assert_eq!(failure.message(), CURRENT_USER_ERROR);
    }

    #[tokio::test]
    async fn test_refresh_keeps_scope_and_rotates_tokens() {
        let mut service = MockAuthService::new();
        service
            .expect_refresh()
            .with(eq("mock-refresh-token-admin"))
            .times(1)
            .returning(|_| {
                Ok(AuthResult::succeeded(
                    "mock-jwt-token-admin-refreshed".into(),
                    Some("mock-refresh-token-admin-new".into()),
                    None,
                ))
            });

        let mut storage = MockTokenStorage::new();
        storage
            .expect_load()
            .returning(|| Ok(Some(stored(Some("mock-refresh-token-admin"), true))));
        storage
            .expect_save_token()
            .withf(|s| {
                s.token == "mock-jwt-token-admin-refreshed"
                    && s.refresh_token.as_deref() == Some("mock-refresh-token-admin-new")
                    && s.remember
            })
            .times(1)
            .returning(|_| Ok(()));

        let result = RefreshSessionUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap();

        assert_eq!(result.token.as_deref(), Some("mock-jwt-token-admin-refreshed"));
    }

    #[tokio::test]
    async fn test_refresh_keeps_old_refresh_token_when_not_rotated() {
        let mut service = MockAuthService::new();
        service
            .expect_refresh()
            .returning(|_| Ok(AuthResult::succeeded("new".into(), None, None)));

        let mut storage = MockTokenStorage::new();
        storage
            .expect_load()
            .returning(|| Ok(Some(stored(Some("keep-me"), false))));
        storage
            .expect_save_token()
            .withf(|s| s.token == "new" && s.refresh_token.as_deref() == Some("keep-me") && !s.remember)
            .times(1)
            .returning(|_| Ok(()));

        RefreshSessionUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refresh_without_session() {
        let mut service = MockAuthService::new();
        service.expect_refresh().never();
        let mut storage = MockTokenStorage::new();
        storage.expect_load().returning(|| Ok(None));

        let failure = RefreshSessionUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap_err();

        assert_eq!(failure.message(), NOT_AUTHENTICATED);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let mut service = MockAuthService::new();
        service.expect_refresh().never();
        let mut storage = MockTokenStorage::new();
        storage
            .expect_load()
            .returning(|| Ok(Some(stored(None, true))));

        let failure = RefreshSessionUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap_err();

        assert_eq!(failure.message(), NO_REFRESH_TOKEN);
    }

    #[tokio::test]
    async fn test_refresh_rejected_keeps_stored_session() {
        let mut service = MockAuthService::new();
        service
            .expect_refresh()
            .returning(|_| Ok(AuthResult::failed("Invalid refresh token")));
        let mut storage = MockTokenStorage::new();
        storage
            .expect_load()
            .returning(|| Ok(Some(stored(Some("stale"), true))));
        storage.expect_save_token().never();

        let failure = RefreshSessionUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap_err();

        assert_eq!(failure.message(), "Invalid refresh token");
    }

    #[tokio::test]
    async fn test_refresh_storage_failure() {
        let mut service = MockAuthService::new();
        service
            .expect_refresh()
            .returning(|_| Ok(AuthResult::succeeded("new".into(), None, None)));
        let mut storage = MockTokenStorage::new();
        storage
            .expect_load()
            .returning(|| Ok(Some(stored(Some("r"), true))));
        storage
            .expect_save_token()
            .returning(|_| Err(anyhow::anyhow!("disk full")));

        let failure = RefreshSessionUseCase::new(Arc::new(service), Arc::new(storage))
            .execute()
            .await
            .unwrap_err();

        assert_eq!(failure.message(), STORAGE_ERROR);
    }

    #[tokio::test]
    async fn test_logout() {
        let mut service = MockAuthService::new();
        service.expect_logout().times(1).returning(|| Ok(()));
        assert!(LogoutUseCase::new(Arc::new(service)).execute().await.is_ok());

        let mut service = MockAuthService::new();
        service
            .expect_logout()
            .returning(|| Err(anyhow::anyhow!("permission denied")));
        let failure = LogoutUseCase::new(Arc::new(service))
            .execute()
            .await
            .unwrap_err();
        assert_eq!(failure.message(), LOGOUT_ERROR);
    }
}
