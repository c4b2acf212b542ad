//! Form validation that reports every invalid field at once.
//!
//! The use cases stop at the first invalid value; a form needs the full list
//! so each field can show its own message.

use serde::Serialize;

use crate::domain::{Email, Name, Password, ValidationError, VerificationCode};

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_CONFIRM_PASSWORD: &str = "confirmPassword";
pub const FIELD_TERMS: &str = "terms";
pub const FIELD_CODE: &str = "code";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message for a field, if it failed.
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn check<T>(&mut self, field: &'static str, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(FieldError {
                    field,
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormValidator;

impl FormValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_credentials(&self, email: &str, password: &str) -> ValidationReport {
        let mut report = ValidationReport::default();
        report.check(FIELD_EMAIL, Email::create(email));
        report.check(FIELD_PASSWORD, Password::create(password));
        report
    }

    /// A mismatched confirmation is only reported when both passwords are
    /// individually valid. Missing terms acceptance is reported last.
    pub fn validate_registration(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
        accepted_terms: bool,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();
        report.check(FIELD_NAME, Name::create(name));
        report.check(FIELD_EMAIL, Email::create(email));
        let password = report.check(FIELD_PASSWORD, Password::create(password));
        let confirmation = report.check(
            FIELD_CONFIRM_PASSWORD,
            Password::create(confirm_password).map_err(|_| ValidationError::InvalidConfirmation),
        );

        if let (Some(password), Some(confirmation)) = (password, confirmation)
            && !password.matches(&confirmation)
        {
            report.check::<()>(FIELD_CONFIRM_PASSWORD, Err(ValidationError::PasswordMismatch));
        }

        if !accepted_terms {
            report.check::<()>(FIELD_TERMS, Err(ValidationError::TermsNotAccepted));
        }

        report
    }

    pub fn validate_verification_code(&self, code: &str) -> ValidationReport {
        let mut report = ValidationReport::default();
        report.check(FIELD_CODE, VerificationCode::create(code));
        report
    }
}
