//! Application layer - Use cases that coordinate domain objects and services.
//!
//! Use cases validate input through the domain value objects and talk to the
//! outside world only through the ports defined in [`ports`].

mod login;
mod oauth;
pub mod ports;
mod session;
mod signup;
pub mod validation;

pub use login::LoginUseCase;
pub use oauth::OAuthLoginUseCase;
pub use ports::{AuthService, TokenStorage};
pub use session::{CurrentUserUseCase, LogoutUseCase, RefreshSessionUseCase};
pub use signup::SignupUseCase;
pub use validation::{FieldError, FormValidator, ValidationReport};

#[cfg(test)]
pub use ports::{MockAuthService, MockTokenStorage};
