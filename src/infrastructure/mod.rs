//! Infrastructure layer - implementations of the application ports.

mod auth_service;
mod bearer;
pub mod token_storage;

pub use auth_service::HttpAuthService;
pub use bearer::BearerTokenInterceptor;
pub use token_storage::{FileTokenStorage, TokenScope, token_expiry};
