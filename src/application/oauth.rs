//! OAuth login use case - resolves the provider redirect URL.

use log::error;
use std::sync::Arc;

use super::ports::AuthService;
use crate::domain::{Failure, OAuthProvider, Outcome};

pub struct OAuthLoginUseCase {
    auth_service: Arc<dyn AuthService>,
}

impl OAuthLoginUseCase {
    pub fn new(auth_service: Arc<dyn AuthService>) -> Self {
        Self { auth_service }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, provider: OAuthProvider) -> Outcome<String> {
        self.auth_service.oauth_url(provider).await.map_err(|e| {
            error!("OAuth URL request failed: {:#}", e);
            Failure::new(format!("OAuth error with {}", provider))
        })
    }
}
