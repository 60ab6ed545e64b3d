//! Account commands for the AniPlay CLI
//!
//! Thin wrappers over [`aniplay_core::AuthSystem`]: prompt for whatever
//! the user did not pass as a flag, run the operation, print the outcome.

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Input, Password};
use std::path::Path;

use aniplay_core::{AppConfig, AuthConfig, AuthSystem};

async fn open_auth(config: &AppConfig, data_dir: &Path) -> Result<AuthSystem> {
    let auth_config = AuthConfig {
        data_dir: data_dir.to_path_buf(),
        token_secret: config.auth.token_secret.clone(),
        token_ttl_days: config.auth.token_ttl_days,
    };

    AuthSystem::new(auth_config)
        .await
        .context("Failed to open the user database")
}

fn prompt_text(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Input::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}

fn prompt_password(value: Option<String>, confirm: bool) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => {
            let mut input = Password::new().with_prompt("Password");
            if confirm {
                input = input.with_confirmation("Confirm password", "Passwords do not match");
            }
            input.interact().context("Failed to read password")
        }
    }
}

/// Register a new account
pub async fn register(
    config: &AppConfig,
    data_dir: &Path,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    println!("AniPlay Registration");
    println!("====================");

    let username = prompt_text(username, "Username")?;
    let email = prompt_text(email, "Email")?;
    let password = prompt_password(password, true)?;

    let auth = open_auth(config, data_dir).await?;
    let message = auth.register(&username, &email, &password).await?;

    println!("\n{} {message}", "✓".green());
    Ok(())
}

/// Log in and persist the session for auto-login
pub async fn login(
    config: &AppConfig,
    data_dir: &Path,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = prompt_text(username, "Username")?;
    let password = prompt_password(password, false)?;

    let auth = open_auth(config, data_dir).await?;
    let token = auth.login(&username, &password).await?;
    let claims = auth.verify_token(&token)?;
    auth.save_session(claims.user_id, &token)
        .await
        .context("Failed to persist the session")?;

    println!("{} Logged in as {}", "✓".green(), claims.username.bold());
    Ok(())
}

/// Clear the persisted session
pub async fn logout(config: &AppConfig, data_dir: &Path) -> Result<()> {
    let auth = open_auth(config, data_dir).await?;

    if auth.current_session().await.is_none() {
        println!("No active session.");
        return Ok(());
    }

    auth.clear_session()
        .await
        .context("Failed to remove the session file")?;
    println!("{} Logged out", "✓".green());
    Ok(())
}

/// Report whether a valid session exists
pub async fn status(config: &AppConfig, data_dir: &Path) -> Result<()> {
    let auth = open_auth(config, data_dir).await?;

    match auth.load_session().await {
        Some(claims) => {
            println!("{} Active session for {}", "✓".green(), claims.username.bold());
        }
        None => {
            println!("No active session.");
            println!("Use 'aniplay auth login' to sign in.");
        }
    }
    Ok(())
}

/// Show the account behind the current session
pub async fn whoami(config: &AppConfig, data_dir: &Path) -> Result<()> {
    let auth = open_auth(config, data_dir).await?;

    let Some(claims) = auth.load_session().await else {
        println!("Not logged in.");
        return Ok(());
    };

    match auth.get_user_info(claims.user_id).await {
        Some(info) => {
            println!("Username: {}", info.username);
            println!("Email:    {}", info.email);
        }
        None => println!("Logged in as {} (account details unavailable)", claims.username),
    }
    Ok(())
}
