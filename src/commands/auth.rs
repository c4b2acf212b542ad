use anyhow::{Context, Result};
use log::debug;

use crate::{
    application::{LoginUseCase, LogoutUseCase, OAuthLoginUseCase, SignupUseCase, TokenStorage},
    domain::{OAuthProvider, StoredSession},
    infrastructure::TokenScope,
    runtime::Runtime,
};

use super::config::Config;

/// Log in and store the returned token in the scope picked by `remember`.
#[tracing::instrument(skip(config, password))]
pub async fn login<R: Runtime + 'static>(
    config: &Config<R>,
    email: &str,
    password: &str,
    remember: bool,
) -> Result<()> {
    let result = LoginUseCase::new(config.auth.clone())
        .execute(email, password, remember)
        .await?;

    if let Some(token) = result.token {
        let session = StoredSession {
            token,
            refresh_token: result.refresh_token,
            remember,
        };
        config
            .storage
            .save_token(&session)
            .context("Failed to store the session token")?;

        let scope = TokenScope::for_remember(remember);
        debug!("Token stored at {:?}", config.storage.path(scope));
        println!("Login successful!");
        if let Some(user) = &result.user {
            println!("Welcome, {} <{}>", user.name, user.email);
        }
        println!("Session stored in {} scope.", scope);
    } else {
        println!("Login successful!");
        println!("The server did not return a token; nothing was stored.");
    }

    Ok(())
}

#[tracing::instrument(skip(config, password, confirm_password))]
pub async fn signup<R: Runtime + 'static>(
    config: &Config<R>,
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
    accept_terms: bool,
) -> Result<()> {
    SignupUseCase::new(config.auth.clone())
        .execute(name, email, password, confirm_password, accept_terms)
        .await?;

    println!("Registration complete! Please log in.");
    Ok(())
}

/// Print the provider's authorization URL for the user to open.
#[tracing::instrument(skip(config))]
pub async fn oauth<R: Runtime + 'static>(config: &Config<R>, provider: OAuthProvider) -> Result<()> {
    let url = OAuthLoginUseCase::new(config.auth.clone())
        .execute(provider)
        .await?;

    println!("Open this URL to continue with {}:", provider);
    println!("{}", url);
    Ok(())
}

#[tracing::instrument(skip(config))]
pub async fn logout<R: Runtime + 'static>(config: &Config<R>) -> Result<()> {
    let had_session = config.storage.stored_scope().is_some();

    LogoutUseCase::new(config.auth.clone()).execute().await?;

    if had_session {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
