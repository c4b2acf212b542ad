//! Signup use case - registration with terms acceptance.

use log::{debug, error};
use std::sync::Arc;

use super::ports::AuthService;
use crate::domain::{AuthResult, Failure, Outcome, User, ValidationError};

const SIGNUP_REJECTED: &str = "Registration failed";
const SIGNUP_ERROR: &str = "Registration failed. Please try again later.";

pub struct SignupUseCase {
    auth_service: Arc<dyn AuthService>,
}

impl SignupUseCase {
    pub fn new(auth_service: Arc<dyn AuthService>) -> Self {
        Self { auth_service }
    }

    /// Terms acceptance is checked first, then the whole user is validated
    /// (including that the confirmation matches) before calling the service.
    #[tracing::instrument(skip(self, password, confirm_password))]
    pub async fn execute(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
        accepted_terms: bool,
    ) -> Outcome<AuthResult> {
        if !accepted_terms {
            debug!("Terms not accepted");
            return Err(ValidationError::TermsNotAccepted.into());
        }

        let user = User::create(name, email, password, confirm_password).map_err(|e| {
            debug!("Validation failed: {}", e);
            Failure::from(e)
        })?;

        debug!("User validated, calling auth service");

        match self.auth_service.signup(&user).await {
            Ok(result) if result.success => {
                debug!(
                    "Signup accepted (user: {}, token: {})",
                    result.user.is_some(),
                    result.token.is_some()
                );
                Ok(result)
            }
            Ok(result) => {
                debug!("Signup rejected: {:?}", result.error);
                Err(Failure::new(
                    result.error.unwrap_or_else(|| SIGNUP_REJECTED.to_string()),
                ))
            }
            Err(e) => {
                error!("Signup request failed: {:#}", e);
                Err(Failure::new(SIGNUP_ERROR))
            }
        }
    }
}
