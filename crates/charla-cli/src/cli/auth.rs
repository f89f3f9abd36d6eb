//! Account commands: register, login, logout, whoami.
//!
//! Credentials are prompted with hidden input and wrapped in
//! [`SecretString`] before they reach the orchestrator.

use anyhow::Result;
use console::style;
use dialoguer::{Input, Password};
use secrecy::SecretString;

use crate::state::AppState;

/// Create an account and log in.
///
/// # Examples
///
/// ```bash
/// # Interactive
/// charla register
///
/// # With flags (password is always prompted)
/// charla register --username ana --email ana@example.com
/// ```
pub async fn register(
    state: &AppState,
    username: Option<String>,
    email: Option<String>,
    json: bool,
) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()?,
    };

    let email = match email {
        Some(e) => e,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()?,
    };

    let password = SecretString::from(
        Password::new()
            .with_prompt("Password (min 8 characters)")
            .interact()?,
    );
    let confirm = SecretString::from(
        Password::new()
            .with_prompt("Confirm password")
            .interact()?,
    );

    let user = state
        .orchestrator
        .register_user(&username, &email, &password, &confirm)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Account created. You are logged in as {}.",
        style("✓").green().bold(),
        style(&user.username).cyan()
    );
    println!();

    Ok(())
}

/// Log in with an existing account.
pub async fn login(state: &AppState, username: Option<String>, json: bool) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()?,
    };

    let password = SecretString::from(Password::new().with_prompt("Password").interact()?);

    let user = state.orchestrator.login_user(&username, &password).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Logged in as {}.",
        style("✓").green().bold(),
        style(&user.username).cyan()
    );
    println!();

    Ok(())
}

/// Log out and forget the saved session.
pub async fn logout(state: &AppState, json: bool) -> Result<()> {
    state.orchestrator.logout().await?;

    if json {
        println!("{}", serde_json::json!({"logged_out": true}));
        return Ok(());
    }

    println!();
    println!("  {} Logged out.", style("✓").green().bold());
    println!();

    Ok(())
}

/// Show the currently logged-in user.
pub async fn whoami(state: &AppState, json: bool) -> Result<()> {
    match state.orchestrator.current_user() {
        Some(user) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
                return Ok(());
            }
            let validity = if state.orchestrator.is_authenticated() {
                style("session active").green()
            } else {
                style("session expired, log in again").yellow()
            };
            println!();
            println!(
                "  {} ({}) -- {}",
                style(&user.username).cyan().bold(),
                user.email,
                validity
            );
            println!();
        }
        None => {
            if json {
                println!("{}", serde_json::json!({"user": null}));
                return Ok(());
            }
            println!();
            println!(
                "  {} Not logged in. Try: {}",
                style("i").blue().bold(),
                style("charla login").yellow()
            );
            println!();
        }
    }

    Ok(())
}
