//! Email verification codes and their expiry window.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

use super::ValidationError;

/// A six digit code as sent by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub const LENGTH: usize = 6;

    pub fn create(code: &str) -> Result<Self, ValidationError> {
        if code.len() != Self::LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidVerificationCode);
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validity window of the most recently sent code. Resending restarts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationWindow {
    sent_at: DateTime<Utc>,
}

impl VerificationWindow {
    pub const TTL: TimeDelta = TimeDelta::minutes(5);

    pub fn new(sent_at: DateTime<Utc>) -> Self {
        Self { sent_at }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.sent_at + Self::TTL
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Time left, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.expires_at() - now).max(TimeDelta::zero())
    }

    /// Remaining time as `m:ss`.
    pub fn format_remaining(&self, now: DateTime<Utc>) -> String {
        let seconds = self.remaining(now).num_seconds();
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }

    pub fn resend(&mut self, now: DateTime<Utc>) {
        self.sent_at = now;
    }
}
