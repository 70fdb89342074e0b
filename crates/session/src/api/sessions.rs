// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device sessions of the signed-in user.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::ApiRequest;

/// A login on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSession {
    pub id: u64,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ApiClient {
    pub async fn list_sessions(&self) -> Result<Vec<DeviceSession>, ClientError> {
        self.send_list(ApiRequest::get("/session/list")).await
    }

    pub async fn revoke_session(&self, id: u64) -> Result<String, ClientError> {
        self.send_ack(ApiRequest::delete(format!("/session/{id}")), "session revoked").await
    }

    /// Revoke every device session except the current one.
    pub async fn revoke_other_sessions(&self) -> Result<String, ClientError> {
        self.send_ack(ApiRequest::delete("/session/all"), "other sessions revoked").await
    }
}
