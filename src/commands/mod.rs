//! CLI commands. Each one wires a use case to the configured services and
//! prints the outcome.

mod auth;
pub mod config;
mod session;
mod validate;

pub use auth::{login, logout, oauth, signup};
pub use config::{Config, Settings};
pub use session::{me, refresh, status};
pub use validate::{ValidateOptions, validate};
