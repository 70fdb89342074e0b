// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `astropass admin`. Every subcommand needs the admin role.

use astropass_session::ApiClient;

use crate::output::{or_dash, table, Output};

#[derive(Debug, clap::Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum AdminCommand {
    /// List user accounts.
    Users {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Account totals.
    Stats,
    /// Roles and the permissions they carry.
    Roles,
    /// All permissions.
    Permissions,
    /// Database backups.
    #[command(subcommand)]
    Backups(BackupCommand),
}

#[derive(Debug, clap::Subcommand)]
pub enum BackupCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    Create,
    Delete { id: u64 },
}

impl AdminArgs {
    pub fn route(&self) -> &'static str {
        match self.command {
            AdminCommand::Users { .. } | AdminCommand::Stats => "/admin/users",
            AdminCommand::Roles | AdminCommand::Permissions => "/admin/roles",
            AdminCommand::Backups(_) => "/admin/backup",
        }
    }
}

pub async fn run(args: AdminArgs, client: &ApiClient, out: &Output) -> anyhow::Result<()> {
    match args.command {
        AdminCommand::Users { page, page_size } => {
            let listing = client.list_users(page, page_size).await?;
            out.emit(&listing, || {
                let rows: Vec<Vec<String>> = listing
                    .users
                    .iter()
                    .map(|u| {
                        let roles: Vec<&str> = u.roles.iter().map(|r| r.name.as_str()).collect();
                        vec![
                            u.id.to_string(),
                            u.username.clone(),
                            or_dash(Some(&u.email)),
                            or_dash(Some(&u.status)),
                            or_dash(Some(&roles.join(","))),
                        ]
                    })
                    .collect();
                let p = &listing.pagination;
                format!(
                    "{}\npage {}/{} ({} users)",
                    table(&["ID", "USERNAME", "EMAIL", "STATUS", "ROLES"], &rows),
                    p.page,
                    p.total_pages.max(1),
                    p.total
                )
            })
        }
        AdminCommand::Stats => {
            let stats = client.user_stats().await?;
            out.emit(&stats, || {
                format!(
                    "total:      {}\nactive:     {}\nsuspended:  {}\nmfa:        {}",
                    stats.total_users,
                    stats.active_users,
                    stats.suspended_users,
                    stats.mfa_enabled_users
                )
            })
        }
        AdminCommand::Roles => {
            let roles = client.list_roles().await?;
            out.emit(&roles, || {
                let rows: Vec<Vec<String>> = roles
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.name.clone(),
                            or_dash(Some(&r.display_name)),
                            r.permissions.len().to_string(),
                        ]
                    })
                    .collect();
                table(&["ID", "NAME", "DISPLAY", "PERMISSIONS"], &rows)
            })
        }
        AdminCommand::Permissions => {
            let permissions = client.list_permissions().await?;
            out.emit(&permissions, || {
                let rows: Vec<Vec<String>> = permissions
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            p.name.clone(),
                            or_dash(Some(&p.resource)),
                            or_dash(Some(&p.action)),
                        ]
                    })
                    .collect();
                table(&["ID", "NAME", "RESOURCE", "ACTION"], &rows)
            })
        }
        AdminCommand::Backups(BackupCommand::List { page, page_size }) => {
            let listing = client.list_backups(page, page_size).await?;
            out.emit(&listing, || {
                let rows: Vec<Vec<String>> = listing
                    .backups
                    .iter()
                    .map(|b| {
                        vec![
                            b.id.to_string(),
                            or_dash(Some(&b.file_name)),
                            b.file_size.to_string(),
                            or_dash(Some(&b.status)),
                            or_dash(b.created_at.as_deref()),
                        ]
                    })
                    .collect();
                table(&["ID", "FILE", "BYTES", "STATUS", "CREATED"], &rows)
            })
        }
        AdminCommand::Backups(BackupCommand::Create) => out.message(&client.create_backup().await?),
        AdminCommand::Backups(BackupCommand::Delete { id }) => {
            out.message(&client.delete_backup(id).await?)
        }
    }
}
