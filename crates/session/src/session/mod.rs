// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The authenticated session: identity, token pair, persistence and lifecycle state.

pub mod manager;
pub mod persist;
pub mod state;
pub mod store;

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub use manager::{SessionManager, SessionSnapshot};
pub use state::{SessionEvent, SessionState};
pub use store::{Persistence, SessionStore, StoreHealth};

/// A role granted to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// Identity record of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(rename = "uuid", default)]
    pub external_id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default)]
    pub mfa_enabled: bool,
    #[serde(default)]
    pub email_verified: bool,
    /// Ordered; first-seen order from the backend is kept.
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl User {
    /// Normalize a record received from the backend.
    ///
    /// Empty nicknames become absent and repeated role ids are dropped,
    /// keeping the first occurrence.
    pub fn normalized(mut self) -> Self {
        if self.nickname.as_deref().is_some_and(|n| n.trim().is_empty()) {
            self.nickname = None;
        }
        let mut seen = Vec::with_capacity(self.roles.len());
        self.roles.retain(|role| {
            if seen.contains(&role.id) {
                false
            } else {
                seen.push(role.id);
                true
            }
        });
        self
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    /// Nickname if set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }
}

/// Token pair issued by login or refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// An authenticated session.
///
/// Both tokens are always non-empty; a value of this type is proof of
/// authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
    access_token: String,
    refresh_token: String,
    /// Access token expiry as epoch seconds, when the backend told us.
    expires_at: Option<u64>,
}

impl Session {
    pub fn new(
        user: User,
        access_token: String,
        refresh_token: String,
        expires_at: Option<u64>,
    ) -> Result<Self, ClientError> {
        if access_token.trim().is_empty() {
            return Err(ClientError::malformed(200, "empty access token"));
        }
        if refresh_token.trim().is_empty() {
            return Err(ClientError::malformed(200, "empty refresh token"));
        }
        Ok(Self { user, access_token, refresh_token, expires_at })
    }

    /// Build a session from a login grant. A grant without a refresh token is rejected.
    pub fn from_grant(user: User, grant: TokenGrant) -> Result<Self, ClientError> {
        let expires_at = grant.expires_in.map(|s| epoch_secs() + s);
        Self::new(user, grant.access_token, grant.refresh_token.unwrap_or_default(), expires_at)
    }

    /// Apply a refresh grant. A grant without a refresh token keeps the current one.
    pub fn rotated(&self, grant: TokenGrant) -> Result<Self, ClientError> {
        let refresh_token = grant
            .refresh_token
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.refresh_token.clone());
        let expires_at = grant.expires_in.map(|s| epoch_secs() + s);
        Self::new(self.user.clone(), grant.access_token, refresh_token, expires_at)
    }

    pub fn with_user(&self, user: User) -> Self {
        Self { user, ..self.clone() }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// Whether the access token is past, or within `margin_secs` of, its expiry.
    pub fn is_expiring(&self, now: u64, margin_secs: u64) -> bool {
        match self.expires_at {
            Some(at) => at.saturating_sub(margin_secs) <= now,
            None => false,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.username)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Current epoch seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
