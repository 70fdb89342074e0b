// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `astropass sessions` and `astropass sso`.

use serde_json::json;
use tokio_util::sync::CancellationToken;

use astropass_session::logout::LogoutCascadeStatus;
use astropass_session::ApiClient;

use crate::output::{or_dash, table, Output};

#[derive(Debug, clap::Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SessionsCommand {
    /// List devices signed in to your account.
    List,
    /// Sign one device out.
    Revoke { id: u64 },
    /// Sign every other device out.
    RevokeOthers,
}

#[derive(Debug, clap::Args)]
pub struct SsoArgs {
    #[command(subcommand)]
    pub command: SsoCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SsoCommand {
    /// List single sign-on sessions.
    List,
    /// Log an SSO session out of every connected application.
    Logout {
        session_id: String,
        /// Poll until every application has been notified.
        #[arg(long)]
        wait: bool,
    },
    /// Show the progress of an SSO logout.
    Status { request_id: String },
}

pub async fn sessions(args: SessionsArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    match args.command {
        SessionsCommand::List => {
            let sessions = client.list_sessions().await?;
            out.emit(&sessions, || {
                let rows: Vec<Vec<String>> = sessions
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.to_string(),
                            or_dash(Some(&s.device)),
                            or_dash(Some(&s.ip)),
                            or_dash(s.location.as_deref()),
                            or_dash(s.last_activity.as_deref()),
                        ]
                    })
                    .collect();
                table(&["ID", "DEVICE", "IP", "LOCATION", "LAST ACTIVE"], &rows)
            })
        }
        SessionsCommand::Revoke { id } => out.message(&client.revoke_session(id).await?),
        SessionsCommand::RevokeOthers => out.message(&client.revoke_other_sessions().await?),
    }
}

pub(crate) fn describe_cascade(status: &LogoutCascadeStatus) -> String {
    let mut text = format!(
        "{}: {} ({}/{} notified, {} failed)",
        status.request_id,
        status.status.as_str(),
        status.completed_clients,
        status.total_clients,
        status.failed_clients,
    );
    for n in &status.notifications {
        let code = n.response_code.map(|c| c.to_string());
        text.push_str(&format!(
            "\n  {:<20} {:<8} attempts={} code={}",
            n.client_id,
            format!("{:?}", n.status).to_lowercase(),
            n.attempt_count,
            or_dash(code.as_deref()),
        ));
    }
    text
}

pub async fn sso(args: SsoArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    match args.command {
        SsoCommand::List => {
            let sessions = client.list_sso_sessions().await?;
            out.emit(&sessions, || {
                let rows: Vec<Vec<String>> = sessions
                    .iter()
                    .map(|s| {
                        vec![
                            s.session_id.clone(),
                            or_dash(Some(&s.client_name)),
                            or_dash(Some(&s.status)),
                            or_dash(s.created_at.as_deref()),
                        ]
                    })
                    .collect();
                table(&["SESSION", "APPLICATION", "STATUS", "CREATED"], &rows)
            })
        }
        SsoCommand::Status { request_id } => {
            let status = client.poll_logout_status(&request_id).await?;
            out.emit(&status, || describe_cascade(&status))
        }
        SsoCommand::Logout { session_id, wait } => {
            let started = client.logout_sso(&session_id).await?;
            if !wait {
                return out.emit(&started, || {
                    format!(
                        "logout started: {} ({} applications)\ncheck progress with `astropass sso status {}`",
                        started.request_id, started.total_clients, started.request_id
                    )
                });
            }

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_signal.cancel();
                }
            });

            let json = out.is_json();
            let last = client
                .watch_logout(
                    &started.request_id,
                    client.config().logout_poll_interval(),
                    &cancel,
                    |status| {
                        if !json {
                            eprintln!(
                                "{}: {}/{} notified",
                                status.status.as_str(),
                                status.completed_clients,
                                status.total_clients
                            );
                        }
                    },
                )
                .await?;
            match last {
                Some(status) => out.emit(&status, || describe_cascade(&status)),
                None => out.emit(&json!({ "request_id": started.request_id }), || {
                    format!("stopped waiting for {}", started.request_id)
                }),
            }
        }
    }
}
