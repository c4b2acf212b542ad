//! Entities built from validated value objects, plus the plain data exchanged
//! with the auth API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Email, Name, Password, ValidationError};

/// Login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: Email,
    password: Password,
    remember_me: bool,
}

/// Wire form of [`Credentials`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub remember_me: bool,
}

impl Credentials {
    pub fn create(email: &str, password: &str, remember_me: bool) -> Result<Self, ValidationError> {
        let email = Email::create(email)?;
        let password = Password::create(password)?;

        Ok(Self {
            email,
            password,
            remember_me,
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me
    }

    pub fn to_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            email: self.email.as_str(),
            password: self.password.as_str(),
            remember_me: self.remember_me,
        }
    }
}

/// A user being registered.
#[derive(Debug, Clone)]
pub struct User {
    name: Name,
    email: Email,
    password: Password,
}

/// Wire form of [`User`].
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl User {
    /// Validates every field in order (name, email, password, confirmation)
    /// and then requires the confirmation to match the password.
    pub fn create(
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, ValidationError> {
        let name = Name::create(name)?;
        let email = Email::create(email)?;
        let password = Password::create(password)?;
        let confirmation =
            Password::create(confirm_password).map_err(|_| ValidationError::InvalidConfirmation)?;

        if !password.matches(&confirmation) {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(Self {
            name,
            email,
            password,
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn to_request(&self) -> SignupRequest<'_> {
        SignupRequest {
            name: self.name.as_str(),
            email: self.email.as_str(),
            password: self.password.as_str(),
        }
    }
}

/// Account details returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

/// Outcome of a login, signup or refresh call as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResult {
    pub fn succeeded(token: String, refresh_token: Option<String>, user: Option<UserInfo>) -> Self {
        Self {
            success: true,
            token: Some(token),
            refresh_token,
            user,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Supported OAuth identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    GitHub,
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OAuthProvider::Google => write!(f, "google"),
            OAuthProvider::GitHub => write!(f, "github"),
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::GitHub),
            _ => anyhow::bail!("Unknown OAuth provider: {}. Expected google or github.", s),
        }
    }
}

/// A token persisted between runs.
///
/// `remember` selects the storage scope: persistent ("local") when true,
/// temporary ("session") otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub remember: bool,
}
