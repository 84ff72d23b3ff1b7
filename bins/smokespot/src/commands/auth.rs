//! Account commands: login, signup, logout, whoami

use super::{Backend, Context};
use crate::output::{print_json, Status};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use smokespot_api_client::{Session, SignUpOutcome};

fn session_json(session: &Session) -> serde_json::Value {
    json!({
        "user_id": session.user.id,
        "email": session.user.email,
        "expires_at": session.expires_at,
    })
}

pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let backend = Backend::connect(ctx)?;
    let session = backend.auth.sign_in(email, password).await?;
    backend.store.save(&session)?;

    if ctx.format.is_json() {
        return print_json(&session_json(&session));
    }
    Status::success(&format!(
        "Signed in as {}",
        session.user.email.as_deref().unwrap_or(email)
    ));
    Ok(())
}

pub async fn signup(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let backend = Backend::connect(ctx)?;
    let outcome = backend.auth.sign_up(email, password).await?;

    match outcome {
        SignUpOutcome::SignedIn(session) => {
            backend.store.save(&session)?;
            if ctx.format.is_json() {
                return print_json(&session_json(&session));
            }
            Status::success(&format!("Account created, signed in as {email}"));
        }
        SignUpOutcome::ConfirmationRequired(user) => {
            if ctx.format.is_json() {
                return print_json(&json!({
                    "user_id": user.id,
                    "email": user.email,
                    "confirmation_required": true,
                }));
            }
            Status::success("Account created");
            Status::info("Check your email to confirm the account, then run `smokespot login`");
        }
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let backend = Backend::connect(ctx)?;
    let session = match backend.session().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Could not restore session");
            None
        }
    };

    // The local session goes away even if the server call fails.
    let result = backend.auth.sign_out().await;
    backend.store.clear()?;
    result?;

    if ctx.format.is_json() {
        return print_json(&json!({ "signed_out": session.is_some() }));
    }
    if session.is_some() {
        Status::success("Signed out");
    } else {
        Status::info("Not signed in");
    }
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let backend = Backend::connect(ctx)?;
    let session = backend.session().await?;

    if ctx.format.is_json() {
        return print_json(&session.as_ref().map(session_json));
    }

    match session {
        Some(session) => {
            println!(
                "{} {}",
                session.user.email.as_deref().unwrap_or("(no email)").bold(),
                format!("[{}]", session.user.id).dimmed()
            );
            println!(
                "{}",
                format!("session valid until {}", session.expires_at.format("%Y-%m-%d %H:%M UTC")).dimmed()
            );
        }
        None => Status::info("Not signed in. Run `smokespot login` to sign in."),
    }
    Ok(())
}
