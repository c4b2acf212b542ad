use anyhow::Result;

use crate::{
    application::{AuthService, CurrentUserUseCase, RefreshSessionUseCase, TokenStorage},
    domain::UserInfo,
    infrastructure::token_expiry,
    runtime::Runtime,
};

use super::config::Config;

#[tracing::instrument(skip(config))]
pub async fn me<R: Runtime + 'static>(config: &Config<R>) -> Result<()> {
    let user = CurrentUserUseCase::new(config.auth.clone(), config.storage.clone())
        .execute()
        .await?;

    print_user(&user);
    Ok(())
}

fn print_user(user: &UserInfo) {
    println!("Name: {}", user.name);
    println!("Email: {}", user.email);
    println!("ID: {}", user.id);
    if let Some(role) = &user.role {
        println!("Role: {}", role);
    }
    if !user.permissions.is_empty() {
        println!("Permissions: {}", user.permissions.join(", "));
    }
}

#[tracing::instrument(skip(config))]
pub async fn refresh<R: Runtime + 'static>(config: &Config<R>) -> Result<()> {
    RefreshSessionUseCase::new(config.auth.clone(), config.storage.clone())
        .execute()
        .await?;

    println!("Session refreshed.");
    Ok(())
}

/// Report what is stored locally without contacting the server.
#[tracing::instrument(skip(config))]
pub fn status<R: Runtime + 'static>(config: &Config<R>) -> Result<()> {
    for line in status_lines(config) {
        println!("{}", line);
    }
    Ok(())
}

fn status_lines<R: Runtime + 'static>(config: &Config<R>) -> Vec<String> {
    let Some(scope) = config.storage.stored_scope() else {
        return vec!["Not logged in.".to_string()];
    };

    let expiry = match config.storage.token().as_deref().and_then(token_expiry) {
        Some(expiry) => expiry.to_rfc3339(),
        None => "unknown".to_string(),
    };
    let authenticated = if config.auth.is_authenticated() {
        "yes"
    } else {
        "no"
    };

    vec![
        format!(
            "Session: {} ({})",
            scope,
            config.storage.path(scope).display()
        ),
        format!("Expires: {}", expiry),
        format!("Authenticated: {}", authenticated),
    ]
}
