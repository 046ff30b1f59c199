//! Account command handlers.
//!
//! Each invocation is its own short-lived session: nothing is persisted
//! between runs, so flows that need a signed-in user (like setting a new
//! password) verify their code and act in the same command.

use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use shelfscan_auth::{AuthSession, AuthState, GoTrueClient, GoTrueConfig, OtpPurpose};
use shelfscan_core::AppConfig;

/// Sub-commands available under `auth`.
#[derive(Debug, Subcommand)]
pub enum AuthCommands {
    /// Create an account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SHELFSCAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in with email and password and show the account
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SHELFSCAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Email a one-time sign-in code
    SendCode {
        #[arg(long)]
        email: String,
    },
    /// Verify an emailed sign-up code
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Email a password recovery code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Verify a recovery code and set a new password
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
        #[arg(long, env = "SHELFSCAN_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

pub(crate) async fn run_auth(config: &AppConfig, command: AuthCommands) -> anyhow::Result<()> {
    let gotrue = GoTrueConfig::from_app_config(config)
        .context("SHELFSCAN_AUTH_URL and SHELFSCAN_AUTH_ANON_KEY must both be set")?;
    let state = AuthState::start(Arc::new(GoTrueClient::new(&gotrue)?)).await;

    let result = run_command(&state, command).await;
    state.shutdown().await;
    result
}

async fn run_command(state: &AuthState, command: AuthCommands) -> anyhow::Result<()> {
    match command {
        AuthCommands::SignUp { email, password } => {
            match state.sign_up(&email, &password).await? {
                Some(session) => print_session(&session),
                None => println!("check {email} for a confirmation code, then run `auth verify`"),
            }
        }
        AuthCommands::SignIn { email, password } => {
            let session = state.sign_in(&email, &password).await?;
            print_session(&session);
            if !state.is_verified() {
                println!("email not confirmed yet; run `auth verify`");
            }
            state.sign_out().await?;
        }
        AuthCommands::SendCode { email } => {
            state.send_otp(&email).await?;
            println!("code sent to {email}");
        }
        AuthCommands::Verify { email, code } => {
            let session = state.verify_otp(&email, &code, OtpPurpose::Signup).await?;
            print_session(&session);
        }
        AuthCommands::ForgotPassword { email } => {
            state.send_password_reset_otp(&email).await?;
            println!("recovery code sent to {email}");
        }
        AuthCommands::ResetPassword {
            email,
            code,
            new_password,
        } => {
            state.verify_password_reset_otp(&email, &code).await?;
            let user = state.update_password(&new_password).await?;
            println!("password updated for {}", user.email.as_deref().unwrap_or("user"));
            state.sign_out().await?;
        }
    }
    Ok(())
}

fn print_session(session: &AuthSession) {
    let user = &session.user;
    println!("user id   {}", user.id);
    if let Some(email) = &user.email {
        println!("email     {email}");
    }
    println!(
        "verified  {}",
        if user.is_verified() { "yes" } else { "no" }
    );
}
