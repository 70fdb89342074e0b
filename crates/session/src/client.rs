// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-aware API client.
//!
//! [`ApiClient::send`] is the request interceptor: it attaches the current
//! access token, turns a 401 into one refresh-and-retry, and signs the session
//! out when the backend keeps rejecting it.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::refresh::RefreshCoordinator;
use crate::session::{SessionManager, SessionSnapshot, SessionState, SessionStore};
use crate::transport::{Access, ApiRequest, ApiResponse, Transport};

/// Handle to the backend and the session it is signed in with.
///
/// Cheap to clone; clones share the session and the refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
    sessions: Arc<SessionManager>,
    refresh: RefreshCoordinator,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    /// Build a client, restoring any persisted session from the configured state dir.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let store = SessionStore::from_path(config.session_path());
        Self::with_store(config, store)
    }

    pub fn with_store(config: ClientConfig, store: SessionStore) -> Result<Self, ClientError> {
        let transport = Transport::new(&config.api_url, config.request_timeout())?;
        let sessions = Arc::new(SessionManager::new(store));
        let refresh = RefreshCoordinator::new(
            Arc::clone(&sessions),
            transport.clone(),
            config.refresh_timeout(),
            config.refresh_margin(),
        );
        Ok(Self { transport, sessions, refresh, config: Arc::new(config) })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.sessions.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.sessions.state()
    }

    /// Send `request` through the interceptor.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ClientError> {
        if request.access == Access::Public {
            return self.transport.dispatch(&request, None).await;
        }

        let held = if self.sessions.state().has_session() {
            Some(self.refresh.ensure_valid_token().await?)
        } else {
            None
        };
        let token = held.as_ref().map(|h| h.token.as_str());

        let rejection = match self.transport.dispatch(&request, token).await {
            Err(ClientError::Authorization(msg)) if token.is_some() && !request.retried => msg,
            other => return other,
        };

        request.retried = true;
        tracing::debug!(path = %request.path, "access token rejected, refreshing");
        let fresh = match self.refresh.refresh_after_unauthorized(token).await {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::debug!(path = %request.path, err = %e, "refresh did not recover request");
                return Err(ClientError::Authorization(rejection));
            }
        };

        match self.transport.dispatch(&request, Some(&fresh.token)).await {
            Err(ClientError::Authorization(msg)) => {
                tracing::warn!(path = %request.path, "request rejected after refresh, signing out");
                self.sessions.clear_if_current(fresh.epoch);
                Err(ClientError::Authorization(msg))
            }
            other => other,
        }
    }

    /// Send and decode the `data` payload.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        self.send(request).await?.data()
    }

    /// Send, keeping only the backend's message.
    pub async fn send_ack(&self, request: ApiRequest, fallback: &str) -> Result<String, ClientError> {
        Ok(self.send(request).await?.message_or(fallback))
    }
}
