// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logout: the local clear path and the backend-driven SSO cascade.
//!
//! The cascade is owned by the backend. This side only starts it and reports
//! what the backend says about it; per-client retries happen server-side.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::ApiRequest;

/// Floor for the cascade poll interval; a zero period would never yield.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Overall progress of an SSO logout cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// A status this client does not know; kept so polling can continue.
    #[serde(other)]
    Unknown,
}

impl CascadeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Outcome of notifying one relying application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Success,
    Failed,
    Timeout,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientNotification {
    pub client_id: String,
    pub status: NotificationStatus,
    #[serde(default)]
    pub response_code: Option<u16>,
    #[serde(default)]
    pub attempt_count: u32,
    #[serde(default)]
    pub last_attempt_at: Option<String>,
}

/// Backend-reported state of one cascade. Notifications keep backend order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutCascadeStatus {
    pub request_id: String,
    pub status: CascadeStatus,
    #[serde(default)]
    pub total_clients: u32,
    #[serde(default)]
    pub completed_clients: u32,
    #[serde(default)]
    pub failed_clients: u32,
    #[serde(default)]
    pub notifications: Vec<ClientNotification>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Acknowledgement of a started cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutStarted {
    pub request_id: String,
    #[serde(default)]
    pub status: Option<CascadeStatus>,
    #[serde(default)]
    pub total_clients: u32,
}

/// A single-sign-on session visible to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoSession {
    pub session_id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct SsoSessionList {
    #[serde(default)]
    sessions: Vec<SsoSession>,
}

impl ApiClient {
    /// Drop the local session. Never fails and never calls the backend.
    ///
    /// Returns whether a session was held.
    pub fn logout_local(&self) -> bool {
        let cleared = self.sessions().clear();
        if cleared {
            tracing::info!("signed out");
        }
        cleared
    }

    /// Ask the backend to start an SSO logout cascade for `session_id`.
    pub async fn logout_sso(&self, session_id: &str) -> Result<LogoutStarted, ClientError> {
        if session_id.trim().is_empty() {
            return Err(ClientError::Validation("session id is required".to_owned()));
        }
        let request = ApiRequest::post("/sso/logout")
            .json(serde_json::json!({ "session_id": session_id }));
        let started: LogoutStarted = self.send_json(request).await?;
        tracing::info!(request_id = %started.request_id, total = started.total_clients, "sso logout started");
        Ok(started)
    }

    pub async fn poll_logout_status(
        &self,
        request_id: &str,
    ) -> Result<LogoutCascadeStatus, ClientError> {
        if request_id.trim().is_empty() {
            return Err(ClientError::Validation("request id is required".to_owned()));
        }
        self.send_json(ApiRequest::get(format!("/sso/logout/{request_id}/status"))).await
    }

    /// Poll a cascade every `interval` until it completes or fails.
    ///
    /// `on_update` sees every status fetched. On cancellation, returns the last
    /// status seen, if any.
    pub async fn watch_logout(
        &self,
        request_id: &str,
        interval: Duration,
        cancel: &CancellationToken,
        mut on_update: impl FnMut(&LogoutCascadeStatus),
    ) -> Result<Option<LogoutCascadeStatus>, ClientError> {
        let mut timer = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut last = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(last),
                _ = timer.tick() => {}
            }

            let status = self.poll_logout_status(request_id).await?;
            on_update(&status);
            if status.status.is_terminal() {
                tracing::info!(
                    request_id,
                    status = status.status.as_str(),
                    completed = status.completed_clients,
                    failed = status.failed_clients,
                    "sso logout finished"
                );
                return Ok(Some(status));
            }
            last = Some(status);
        }
    }

    pub async fn list_sso_sessions(&self) -> Result<Vec<SsoSession>, ClientError> {
        let list: SsoSessionList = self.send_json(ApiRequest::get("/sso/sessions")).await?;
        Ok(list.sessions)
    }
}

#[cfg(test)]
#[path = "logout_tests.rs"]
mod tests;
