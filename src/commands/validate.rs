use anyhow::Result;

use crate::application::{FormValidator, ValidationReport};
use crate::domain::PasswordStrength;

/// Form input to check locally.
///
/// With a name the input is checked as a registration form, otherwise as
/// login credentials. The confirmation defaults to the password.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions<'a> {
    pub name: Option<&'a str>,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: Option<&'a str>,
    pub accept_terms: bool,
    /// Email verification code, checked in addition to the form
    pub code: Option<&'a str>,
}

/// Check form input locally and list every invalid field.
#[tracing::instrument(skip_all)]
pub fn validate(options: &ValidateOptions<'_>) -> Result<()> {
    if options.name.is_some() && !options.password.is_empty() {
        println!("Password strength: {}", PasswordStrength::of(options.password));
    }

    let report = build_report(options);

    if report.is_valid() {
        println!("All fields are valid.");
        return Ok(());
    }

    for error in &report.errors {
        println!("  {}: {}", error.field, error.message);
    }
    anyhow::bail!("{} invalid field(s)", report.errors.len())
}

fn build_report(options: &ValidateOptions<'_>) -> ValidationReport {
    let validator = FormValidator::new();
    let mut report = match options.name {
        Some(name) => validator.validate_registration(
            name,
            options.email,
            options.password,
            options.confirm_password.unwrap_or(options.password),
            options.accept_terms,
        ),
        None => validator.validate_credentials(options.email, options.password),
    };

    if let Some(code) = options.code {
        report
            .errors
            .extend(validator.validate_verification_code(code).errors);
    }

    report
}
