//! File-backed token storage.
//!
//! A remembered session lives in the user's data directory and survives
//! reboots; an unremembered one lives under the temp directory. Only one
//! scope holds a session at a time.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::application::TokenStorage;
use crate::domain::StoredSession;
use crate::runtime::Runtime;

const APP_DIR: &str = "authflow";
const SESSION_FILE: &str = "session.json";

/// Overrides both storage locations (`$AUTHFLOW_HOME/session.json` and
/// `$AUTHFLOW_HOME/tmp/session.json`).
pub const HOME_ENV: &str = "AUTHFLOW_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Local,
    Session,
}

impl TokenScope {
    pub fn for_remember(remember: bool) -> Self {
        if remember {
            TokenScope::Local
        } else {
            TokenScope::Session
        }
    }

    fn other(self) -> Self {
        match self {
            TokenScope::Local => TokenScope::Session,
            TokenScope::Session => TokenScope::Local,
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenScope::Local => write!(f, "local"),
            TokenScope::Session => write!(f, "session"),
        }
    }
}

pub struct FileTokenStorage<R: Runtime> {
    runtime: R,
    local_path: PathBuf,
    session_path: PathBuf,
}

impl<R: Runtime> FileTokenStorage<R> {
    /// Resolves the storage locations from `AUTHFLOW_HOME` or the platform
    /// directories.
    pub fn new(runtime: R) -> Result<Self> {
        let (local_path, session_path) = match runtime.env_var(HOME_ENV) {
            Ok(home) if !home.is_empty() => {
                let home = PathBuf::from(home);
                (home.join(SESSION_FILE), home.join("tmp").join(SESSION_FILE))
            }
            _ => {
                let data_dir = runtime
                    .data_dir()
                    .context("Could not determine the user data directory")?;
                (
                    data_dir.join(APP_DIR).join(SESSION_FILE),
                    runtime.temp_dir().join(APP_DIR).join(SESSION_FILE),
                )
            }
        };

        Ok(Self::with_paths(runtime, local_path, session_path))
    }

    pub fn with_paths(runtime: R, local_path: PathBuf, session_path: PathBuf) -> Self {
        Self {
            runtime,
            local_path,
            session_path,
        }
    }

    pub fn path(&self, scope: TokenScope) -> &Path {
        match scope {
            TokenScope::Local => &self.local_path,
            TokenScope::Session => &self.session_path,
        }
    }

    /// The scope currently holding a session, preferring local.
    pub fn stored_scope(&self) -> Option<TokenScope> {
        [TokenScope::Local, TokenScope::Session]
            .into_iter()
            .find(|scope| self.runtime.exists(self.path(*scope)))
    }

    fn read_scope(&self, scope: TokenScope) -> Result<Option<StoredSession>> {
        let path = self.path(scope);
        if !self.runtime.exists(path) {
            return Ok(None);
        }

        let content = self.runtime.read_to_string(path)?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stored session at {:?}", path))?;
        Ok(Some(session))
    }

    fn clear_scope(&self, scope: TokenScope) -> Result<()> {
        let path = self.path(scope);
        if self.runtime.exists(path) {
            debug!("Removing {} session at {:?}", scope, path);
            self.runtime
                .remove_file(path)
                .with_context(|| format!("Failed to remove stored session at {:?}", path))?;
        }
        Ok(())
    }
}

impl<R: Runtime> TokenStorage for FileTokenStorage<R> {
    #[tracing::instrument(skip(self, session))]
    fn save_token(&self, session: &StoredSession) -> Result<()> {
        let scope = TokenScope::for_remember(session.remember);
        let path = self.path(scope);

        if let Some(parent) = path.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime.create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(session)?;
        self.runtime
            .write(path, content.as_bytes())
            .with_context(|| format!("Failed to save session to {:?}", path))?;
        debug!("Stored {} session at {:?}", scope, path);

        self.clear_scope(scope.other())
    }

    fn load(&self) -> Result<Option<StoredSession>> {
        if let Some(session) = self.read_scope(TokenScope::Local)? {
            return Ok(Some(session));
        }
        self.read_scope(TokenScope::Session)
    }

    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(session) => session.map(|s| s.token),
            Err(e) => {
                warn!("Ignoring unreadable stored session: {:#}", e);
                None
            }
        }
    }

    #[tracing::instrument(skip(self))]
    fn remove_token(&self) -> Result<()> {
        self.clear_scope(TokenScope::Local)?;
        self.clear_scope(TokenScope::Session)
    }

    fn is_token_valid(&self) -> bool {
        self.token()
            .and_then(|token| token_expiry(&token))
            .is_some_and(|exp| exp > Utc::now())
    }
}

#[derive(Deserialize)]
struct Claims {
    // NumericDate may carry a fractional part
    exp: Option<f64>,
}

/// Expiry of a JWT, read from the `exp` claim without verifying the
/// signature. `None` for anything that is not a JWT carrying `exp`.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_, payload, _) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&decoded).ok()?;
    let exp = claims.exp.filter(|exp| exp.is_finite())?;
    DateTime::from_timestamp(exp.trunc() as i64, 0)
}
