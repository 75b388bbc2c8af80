//! CLI command handlers.

use std::io::Write;

use crate::auth::AuthError;
use crate::error::{ClientError, Result};
use crate::services::LoginRequest;
use crate::Insurly;

/// Handle `insurly login <user>`.
pub async fn handle_login(app: &Insurly, user_name: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };
    let session = app
        .auth()
        .login(&LoginRequest::new(user_name, password))
        .await?;
    println!("✅ Signed in as {} ({})", session.user.full_name(), session.user.email);
    Ok(())
}

/// Handle `insurly logout`.
pub async fn handle_logout(app: &Insurly) -> Result<()> {
    app.auth_state().load_stored_auth();
    if !app.auth_state().is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }
    app.auth().logout().await?;
    println!("✅ Signed out");
    Ok(())
}

/// Handle `insurly status`.
pub fn handle_status(app: &Insurly) -> Result<()> {
    app.auth_state().load_stored_auth();
    if app.auth_state().is_authenticated() {
        println!("🔐 Signed in (session stored)");
    } else {
        println!("❌ Not signed in");
    }
    println!("   API: {}", app.client().base_url());
    Ok(())
}

/// Handle `insurly profile`.
pub async fn handle_profile(app: &Insurly) -> Result<()> {
    require_session(app)?;
    let user = app.auth().current_user().await?;
    println!("{}", user.full_name());
    println!("  id:    {}", user.id);
    println!("  email: {}", user.email);
    Ok(())
}

/// Handle `insurly policies`.
pub async fn handle_policies(app: &Insurly) -> Result<()> {
    require_session(app)?;
    let policies = app.insurance().insurances_with_claims().await?;
    if policies.is_empty() {
        println!("No policies");
        return Ok(());
    }
    for policy in policies {
        println!(
            "{:<6} {:<24} insured {:>12.2}  claimed {:>12.2}  remaining {:>12.2}",
            policy.insurance.insurance_id,
            policy.insurance.name,
            policy.insurance.insured_sum,
            policy.claimed_amount,
            policy.remaining_sum,
        );
    }
    Ok(())
}

fn require_session(app: &Insurly) -> Result<()> {
    app.auth_state().load_stored_auth();
    if app.auth_state().is_authenticated() {
        Ok(())
    } else {
        println!("Run `insurly login <user>` first");
        Err(AuthError::NotLoggedIn.into())
    }
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    std::io::stdout()
        .flush()
        .map_err(|e| ClientError::Configuration(format!("failed to write prompt: {e}")))?;
    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .map_err(|e| ClientError::Configuration(format!("failed to read password: {e}")))?;
    let password = password.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(ClientError::Configuration("no password provided".into()));
    }
    Ok(password)
}
