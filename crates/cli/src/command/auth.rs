// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `astropass login|register|logout|whoami|forgot-password|reset-password`.

use serde_json::json;

use astropass_session::api::auth::NewAccount;
use astropass_session::{ApiClient, User};

use crate::output::{or_dash, Output};

#[derive(Debug, clap::Args)]
pub struct LoginArgs {
    /// Username.
    pub username: String,
    /// Password.
    #[arg(long, env = "ASTROPASS_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, clap::Args)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "ASTROPASS_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Password confirmation (defaults to --password).
    #[arg(long)]
    pub confirm_password: Option<String>,
    #[arg(long)]
    pub nickname: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct ForgotArgs {
    pub email: String,
}

#[derive(Debug, clap::Args)]
pub struct ResetArgs {
    /// Token from the reset email.
    #[arg(long)]
    pub token: String,
    /// New password.
    #[arg(long, env = "ASTROPASS_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Confirmation (defaults to --password).
    #[arg(long)]
    pub confirm_password: Option<String>,
}

pub(crate) fn describe_user(user: &User) -> String {
    let roles = user.role_names().join(", ");
    format!(
        "{} ({})\n  email:     {}\n  roles:     {}\n  mfa:       {}\n  verified:  {}",
        user.display_name(),
        user.username,
        or_dash(Some(&user.email)),
        if roles.is_empty() { "-".to_owned() } else { roles },
        if user.mfa_enabled { "enabled" } else { "disabled" },
        if user.email_verified { "yes" } else { "no" },
    )
}

pub async fn login(args: LoginArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    let user = client.login(&args.username, &args.password).await?;
    out.emit(&user, || format!("signed in as {}", user.display_name()))
}

pub async fn register(args: RegisterArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    let account = NewAccount {
        confirm_password: args.confirm_password.unwrap_or_else(|| args.password.clone()),
        username: args.username,
        email: args.email,
        password: args.password,
        nickname: args.nickname,
    };
    let user = client.register(&account).await?;
    out.emit(&user, || format!("registered and signed in as {}", user.display_name()))
}

pub fn logout(client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    let was_signed_in = client.logout_local();
    out.emit(&json!({ "signed_out": was_signed_in }), || {
        if was_signed_in { "signed out".to_owned() } else { "not signed in".to_owned() }
    })
}

pub fn whoami(client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    let snap = client.snapshot();
    let user = snap.session.as_ref().map(|s| s.user().clone());
    let storage = client.sessions().store_health();
    out.emit(&json!({ "state": snap.state, "user": user, "storage": storage }), || match user {
        Some(ref user) => format!("{}\n  session:   {}", describe_user(user), snap.state),
        None => format!("not signed in ({})", snap.state),
    })
}

pub async fn forgot_password(args: ForgotArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    let message = client.forgot_password(&args.email).await?;
    out.message(&message)
}

pub async fn reset_password(args: ResetArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    let confirm = args.confirm_password.as_deref().unwrap_or(&args.password);
    let message = client.reset_password(&args.token, &args.password, confirm).await?;
    out.message(&message)
}
