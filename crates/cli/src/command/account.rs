// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `astropass profile|password|mfa`.

use serde_json::json;

use astropass_session::ApiClient;

use crate::command::auth::describe_user;
use crate::output::Output;

#[derive(Debug, clap::Args)]
pub struct ProfileArgs {
    /// Set a new nickname.
    #[arg(long)]
    pub nickname: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct PasswordArgs {
    /// Current password.
    #[arg(long)]
    pub current: String,
    /// New password.
    #[arg(long, env = "ASTROPASS_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Confirmation (defaults to --password).
    #[arg(long)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct MfaArgs {
    #[command(subcommand)]
    pub command: MfaCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum MfaCommand {
    /// Generate a new authenticator secret.
    Setup,
    /// Confirm the authenticator and turn MFA on.
    Enable { code: String },
    /// Turn MFA off.
    Disable { code: String },
    /// Show the recovery codes.
    Codes,
}

pub async fn profile(args: ProfileArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    let user = match args.nickname {
        Some(nickname) => client.update_profile(&nickname).await?,
        None => client.fetch_profile().await?,
    };
    out.emit(&user, || describe_user(&user))
}

pub async fn password(args: PasswordArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    let confirm = args.confirm_password.as_deref().unwrap_or(&args.password);
    let message = client.change_password(&args.current, &args.password, confirm).await?;
    out.message(&message)
}

fn code_list(codes: &[String]) -> String {
    if codes.is_empty() {
        return "(no recovery codes)".to_owned();
    }
    codes.iter().map(|c| format!("  {c}")).collect::<Vec<_>>().join("\n")
}

pub async fn mfa(args: MfaArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    match args.command {
        MfaCommand::Setup => {
            let setup = client.generate_mfa().await?;
            out.emit(&setup, || {
                format!(
                    "secret: {}\nprovisioning url: {}\nconfirm with `astropass mfa enable <code>`",
                    setup.secret, setup.qr_code_url
                )
            })
        }
        MfaCommand::Enable { code } => {
            let codes = client.enable_mfa(&code).await?;
            out.emit(&json!({ "recovery_codes": codes }), || {
                format!("mfa enabled; store these recovery codes:\n{}", code_list(&codes))
            })
        }
        MfaCommand::Disable { code } => {
            let message = client.disable_mfa(&code).await?;
            out.message(&message)
        }
        MfaCommand::Codes => {
            let codes = client.recovery_codes().await?;
            out.emit(&json!({ "recovery_codes": codes }), || code_list(&codes))
        }
    }
}
