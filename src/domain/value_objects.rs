//! Validated value objects for user-supplied credentials.
//!
//! Each type can only be built through its `create` constructor, so holding an
//! `Email`, `Password` or `Name` means the input already passed validation.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use super::VerificationCode;

/// Permissive RFC 5322 style address pattern.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

/// Characters that satisfy the "special character" password rule.
const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Rejected regardless of complexity (compared case-insensitively).
const COMMON_PASSWORDS: [&str; 5] = ["password", "12345678", "qwerty", "abc123", "password1"];

/// Validation failures. The display text is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least {} characters", Password::MIN_LENGTH)]
    PasswordTooShort,

    #[error("Password must contain uppercase, lowercase, numbers and special characters")]
    PasswordTooWeak,

    #[error("Password is too common, choose a more secure one")]
    PasswordTooCommon,

    #[error("Name is required")]
    NameRequired,

    #[error("Name must be at least {} characters", Name::MIN_LENGTH)]
    NameTooShort,

    #[error("Name cannot exceed {} characters", Name::MAX_LENGTH)]
    NameTooLong,

    #[error("Invalid confirmation password")]
    InvalidConfirmation,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("You must accept the terms and conditions")]
    TermsNotAccepted,

    #[error("Verification code must be {} digits", VerificationCode::LENGTH)]
    InvalidVerificationCode,
}

// ============================================================================
// Email
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// Validates and wraps an email address. The address is kept as given.
    pub fn create(email: &str) -> Result<Self, ValidationError> {
        if email.trim().is_empty() {
            return Err(ValidationError::EmailRequired);
        }

        if !EMAIL_PATTERN.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(Self(email.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Password (plain text, only ever sent to the API)
// ============================================================================

#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 8;

    /// Applies the password policy: minimum length, all four character
    /// classes, and not one of the well-known common passwords.
    pub fn create(password: &str) -> Result<Self, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }

        if password.chars().count() < Self::MIN_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }

        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_special = password.chars().any(|c| SPECIAL_CHARACTERS.contains(c));

        if !(has_upper && has_lower && has_digit && has_special) {
            return Err(ValidationError::PasswordTooWeak);
        }

        let lowered = password.to_lowercase();
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            return Err(ValidationError::PasswordTooCommon);
        }

        Ok(Self(password.to_string()))
    }

    /// Returns the password as a string slice (use with caution)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, other: &Password) -> bool {
        self.0 == other.0
    }
}

// Never print the secret
impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Strength hint shown while a password is typed. Independent of the policy
/// enforced by [`Password::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// One point each for 8+ characters, 12+ characters, mixed case, a digit
    /// and a special character.
    pub fn of(password: &str) -> Self {
        let length = password.chars().count();
        let checks = [
            length >= Password::MIN_LENGTH,
            length >= 12,
            password.chars().any(|c| c.is_ascii_lowercase())
                && password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
        ];

        match checks.iter().filter(|passed| **passed).count() {
            0..=2 => Self::Weak,
            3..=4 => Self::Medium,
            _ => Self::Strong,
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        })
    }
}

// ============================================================================
// Name
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 100;

    /// Validates a display name and returns it trimmed with `<` and `>` removed.
    pub fn create(name: &str) -> Result<Self, ValidationError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::NameRequired);
        }

        if trimmed.chars().count() < Self::MIN_LENGTH {
            return Err(ValidationError::NameTooShort);
        }

        if name.chars().count() > Self::MAX_LENGTH {
            return Err(ValidationError::NameTooLong);
        }

        let sanitized: String = trimmed.chars().filter(|c| !matches!(c, '<' | '>')).collect();
        if sanitized.trim().is_empty() {
            return Err(ValidationError::NameRequired);
        }

        Ok(Self(sanitized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
