// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `astropass apps`: consents you granted and OAuth2 clients you registered.

use serde_json::json;

use astropass_session::api::oauth2::NewOAuthClient;
use astropass_session::ApiClient;

use crate::output::{or_dash, table, Output};

#[derive(Debug, clap::Args)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum AppsCommand {
    /// List applications you have authorized.
    List,
    /// Withdraw consent from an application.
    Revoke { client_id: String },
    /// Show what an application asks for.
    Consent { client_id: String },
    /// Grant an application the scopes it asks for.
    Approve {
        client_id: String,
        /// Space separated scopes.
        #[arg(long, default_value = "")]
        scope: String,
    },
    /// Refuse an application's request.
    Deny {
        client_id: String,
        #[arg(long, default_value = "")]
        scope: String,
    },
    /// OAuth2 clients registered by you.
    #[command(subcommand)]
    Clients(ClientsCommand),
}

#[derive(Debug, clap::Subcommand)]
pub enum ClientsCommand {
    List,
    /// Register a client. The secret is printed once.
    Create {
        name: String,
        /// Allowed redirect URI (repeatable).
        #[arg(long = "redirect-uri", required = true)]
        redirect_uris: Vec<String>,
        #[arg(long)]
        client_uri: Option<String>,
        #[arg(long)]
        logo_uri: Option<String>,
    },
    Revoke { client_id: String },
}

pub async fn run(args: AppsArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    match args.command {
        AppsCommand::List => {
            let consents = client.list_consents().await?;
            out.emit(&consents, || {
                let rows: Vec<Vec<String>> = consents
                    .iter()
                    .map(|c| {
                        vec![
                            c.client_id.clone(),
                            or_dash(Some(&c.scope)),
                            or_dash(c.created_at.as_deref()),
                            or_dash(c.expires_at.as_deref()),
                        ]
                    })
                    .collect();
                table(&["CLIENT", "SCOPE", "GRANTED", "EXPIRES"], &rows)
            })
        }
        AppsCommand::Revoke { client_id } => out.message(&client.revoke_consent(&client_id).await?),
        AppsCommand::Consent { client_id } => {
            let info = client.consent_info(&client_id).await?;
            out.emit(&info, || {
                let scopes = if info.scopes.is_empty() {
                    "  (no scopes)".to_owned()
                } else {
                    info.scopes.iter().map(|s| format!("  {s}")).collect::<Vec<_>>().join("\n")
                };
                format!(
                    "{} ({})\nrequests:\n{scopes}",
                    info.client_name,
                    or_dash(info.client_uri.as_deref())
                )
            })
        }
        AppsCommand::Approve { client_id, scope } => {
            out.message(&client.approve_consent(&client_id, &scope).await?)
        }
        AppsCommand::Deny { client_id, scope } => {
            out.message(&client.deny_consent(&client_id, &scope).await?)
        }
        AppsCommand::Clients(cmd) => clients(cmd, client, out).await,
    }
}

async fn clients(cmd: ClientsCommand, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    match cmd {
        ClientsCommand::List => {
            let clients = client.list_clients().await?;
            out.emit(&clients, || {
                let rows: Vec<Vec<String>> = clients
                    .iter()
                    .map(|c| {
                        vec![
                            c.client_id.clone(),
                            c.client_name.clone(),
                            or_dash(Some(&c.status)),
                            or_dash(c.created_at.as_deref()),
                        ]
                    })
                    .collect();
                table(&["CLIENT", "NAME", "STATUS", "CREATED"], &rows)
            })
        }
        ClientsCommand::Create { name, redirect_uris, client_uri, logo_uri } => {
            let form = NewOAuthClient { client_name: name, client_uri, logo_uri, redirect_uris };
            let created = client.create_client(&form).await?;
            let value = json!({
                "client_id": created.client_id,
                "client_name": created.client_name,
                "client_secret": created.client_secret,
                "status": created.status,
            });
            out.emit(&value, || {
                format!(
                    "created {} ({})\nclient secret: {}\nthe secret is not shown again",
                    created.client_name, created.client_id, created.client_secret
                )
            })
        }
        ClientsCommand::Revoke { client_id } => {
            out.message(&client.revoke_client(&client_id).await?)
        }
    }
}
