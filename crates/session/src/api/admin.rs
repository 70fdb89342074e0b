// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Back-office endpoints. The backend enforces permissions; callers gate
//! locally on the `admin` role first.

use serde::{Deserialize, Serialize};

use crate::api::nullable_list;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::session::Role;
use crate::transport::ApiRequest;

/// Largest page the backend serves.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub mfa_enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPage {
    #[serde(default, deserialize_with = "nullable_list")]
    pub users: Vec<AdminUser>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub suspended_users: u64,
    #[serde(default)]
    pub mfa_enabled_users: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub action: String,
}

/// A role together with its permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDetail {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub id: u64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub backup_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupPage {
    #[serde(default, deserialize_with = "nullable_list")]
    pub backups: Vec<Backup>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

fn page_args(page: u32, page_size: u32) -> (u32, u32) {
    (page.max(1), page_size.clamp(1, MAX_PAGE_SIZE))
}

impl ApiClient {
    pub async fn list_users(&self, page: u32, page_size: u32) -> Result<UserPage, ClientError> {
        let (page, page_size) = page_args(page, page_size);
        let request =
            ApiRequest::get("/admin/users").query("page", page).query("page_size", page_size);
        self.send_json(request).await
    }

    pub async fn user_stats(&self) -> Result<UserStats, ClientError> {
        self.send_json(ApiRequest::get("/admin/users/stats")).await
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleDetail>, ClientError> {
        self.send_list(ApiRequest::get("/admin/roles")).await
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, ClientError> {
        self.send_list(ApiRequest::get("/admin/permissions")).await
    }

    pub async fn list_backups(&self, page: u32, page_size: u32) -> Result<BackupPage, ClientError> {
        let (page, page_size) = page_args(page, page_size);
        let request =
            ApiRequest::get("/admin/backup").query("page", page).query("page_size", page_size);
        self.send_json(request).await
    }

    pub async fn create_backup(&self) -> Result<String, ClientError> {
        self.send_ack(ApiRequest::post("/admin/backup"), "backup started").await
    }

    pub async fn delete_backup(&self, id: u64) -> Result<String, ClientError> {
        self.send_ack(ApiRequest::delete(format!("/admin/backup/{id}")), "backup deleted").await
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
