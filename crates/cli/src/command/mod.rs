// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands. Each maps to an application route and is gated on it
//! locally before anything is sent.

pub mod account;
pub mod admin;
pub mod apps;
pub mod auth;
pub mod sessions;

use astropass_session::guard::{gate, route_access, GateDecision, SessionView};
use astropass_session::{ApiClient, ClientError};

use crate::output::Output;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Sign in.
    Login(auth::LoginArgs),
    /// Create an account and sign in.
    Register(auth::RegisterArgs),
    /// Sign out locally.
    Logout,
    /// Show the signed-in user and session state.
    Whoami,
    /// Show or edit your profile.
    Profile(account::ProfileArgs),
    /// Change your password.
    Password(account::PasswordArgs),
    /// Request a password-reset email.
    ForgotPassword(auth::ForgotArgs),
    /// Set a new password with a reset token.
    ResetPassword(auth::ResetArgs),
    /// Multi-factor authentication.
    Mfa(account::MfaArgs),
    /// Devices signed in to your account.
    Sessions(sessions::SessionsArgs),
    /// Single sign-on sessions and cross-application logout.
    Sso(sessions::SsoArgs),
    /// Applications you have authorized.
    Apps(apps::AppsArgs),
    /// Back-office administration.
    Admin(admin::AdminArgs),
}

impl Command {
    /// Application route this command stands for.
    pub fn route(&self) -> &'static str {
        match self {
            Self::Login(_) | Self::Logout => "/login",
            Self::Register(_) => "/register",
            Self::ForgotPassword(_) => "/forgot-password",
            Self::ResetPassword(_) => "/reset-password",
            Self::Whoami => "/dashboard",
            Self::Profile(_) => "/profile",
            Self::Password(_) => "/change-password",
            Self::Mfa(_) => "/mfa",
            Self::Sessions(_) => "/sessions",
            Self::Sso(_) => "/sso/sessions",
            Self::Apps(_) => "/authorized-apps",
            Self::Admin(args) => args.route(),
        }
    }
}

/// Refuse commands the current session may not open.
pub fn check_access(command: &Command, client: &ApiClient) -> Result<(), ClientError> {
    let view = SessionView::from(&client.snapshot());
    match gate(route_access(command.route()), &view) {
        GateDecision::Allow => Ok(()),
        GateDecision::RedirectToLogin => Err(ClientError::Authorization(
            "not signed in; run `astropass login` first".to_owned(),
        )),
        GateDecision::RedirectToDashboard => Err(ClientError::Rejected {
            status: 403,
            message: "this command requires the admin role".to_owned(),
        }),
    }
}

pub async fn run(command: Command, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    check_access(&command, client)?;
    tracing::debug!(route = command.route(), "running command");

    match command {
        Command::Login(args) => auth::login(args, client, out).await,
        Command::Register(args) => auth::register(args, client, out).await,
        Command::Logout => auth::logout(client, out),
        Command::Whoami => auth::whoami(client, out),
        Command::ForgotPassword(args) => auth::forgot_password(args, client, out).await,
        Command::ResetPassword(args) => auth::reset_password(args, client, out).await,
        Command::Profile(args) => account::profile(args, client, out).await,
        Command::Password(args) => account::password(args, client, out).await,
        Command::Mfa(args) => account::mfa(args, client, out).await,
        Command::Sessions(args) => sessions::sessions(args, client, out).await,
        Command::Sso(args) => sessions::sso(args, client, out).await,
        Command::Apps(args) => apps::run(args, client, out).await,
        Command::Admin(args) => admin::run(args, client, out).await,
    }
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::Validation(_)) => 2,
        Some(ClientError::Authorization(_) | ClientError::AuthenticationFailure(_)) => 3,
        _ => 1,
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
