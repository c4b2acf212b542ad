//! Success/failure outcome returned by every use case.
//!
//! `Outcome<T>` is a plain `Result` whose error side is a [`Failure`]: an
//! immutable, user-facing message. Expected failure paths (bad input, rejected
//! credentials, unreachable server) all end up here instead of propagating
//! lower-level errors to the caller.

use std::fmt;

use super::ValidationError;

/// Used when a failure is built from an empty message.
const UNKNOWN_FAILURE: &str = "Something went wrong";

pub type Outcome<T> = Result<T, Failure>;

/// A user-facing failure message. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self {
                message: UNKNOWN_FAILURE.to_string(),
            }
        } else {
            Self { message }
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

impl From<ValidationError> for Failure {
    fn from(error: ValidationError) -> Self {
        Self::new(error.to_string())
    }
}
