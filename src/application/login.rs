//! Login use case - validates credentials and delegates to the auth service.

use log::{debug, error};
use std::sync::Arc;

use super::ports::AuthService;
use crate::domain::{AuthResult, Credentials, Failure, Outcome};

const LOGIN_REJECTED: &str = "Login failed";
const LOGIN_ERROR: &str = "Login failed. Please try again later.";

pub struct LoginUseCase {
    auth_service: Arc<dyn AuthService>,
}

impl LoginUseCase {
    pub fn new(auth_service: Arc<dyn AuthService>) -> Self {
        Self { auth_service }
    }

    /// Invalid input never reaches the service. Service errors are logged and
    /// replaced by a generic message.
    #[tracing::instrument(skip(self, password))]
    pub async fn execute(&self, email: &str, password: &str, remember_me: bool) -> Outcome<AuthResult> {
        let credentials = Credentials::create(email, password, remember_me)?;

        match self.auth_service.login(&credentials).await {
            Ok(result) if result.success => {
                debug!("Login accepted for {}", credentials.email());
                Ok(result)
            }
            Ok(result) => Err(Failure::new(
                result.error.unwrap_or_else(|| LOGIN_REJECTED.to_string()),
            )),
            Err(e) => {
                error!("Login request failed: {:#}", e);
                Err(Failure::new(LOGIN_ERROR))
            }
        }
    }
}
