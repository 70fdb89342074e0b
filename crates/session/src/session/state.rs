// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No session. Resting state.
    #[default]
    Anonymous,
    /// Login or register-then-login in flight.
    Authenticating,
    Authenticated,
    /// Access token known to be past (or near) its expiry; refresh token still held.
    Expired,
    /// The single refresh call is outstanding.
    Refreshing,
}

/// Inputs that drive [`SessionState`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoginStarted,
    LoginSucceeded,
    LoginFailed,
    TokenExpired,
    RefreshStarted,
    RefreshSucceeded,
    RefreshFailed,
    LoggedOut,
}

/// A transition the machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid session transition: {event:?} in {from}")]
pub struct InvalidTransition {
    pub from: SessionState,
    pub event: SessionEvent,
}

impl SessionState {
    /// Next state for `event`, or an error if the event is not valid here.
    pub fn on(self, event: SessionEvent) -> Result<Self, InvalidTransition> {
        use SessionEvent as E;
        use SessionState as S;

        let next = match (self, event) {
            (_, E::LoggedOut) => S::Anonymous,
            (S::Anonymous, E::LoginStarted) => S::Authenticating,
            (S::Authenticating, E::LoginSucceeded) => S::Authenticated,
            (S::Authenticating, E::LoginFailed) => S::Anonymous,
            (S::Authenticated, E::TokenExpired) => S::Expired,
            (S::Authenticated | S::Expired, E::RefreshStarted) => S::Refreshing,
            (S::Refreshing, E::RefreshSucceeded) => S::Authenticated,
            (S::Refreshing, E::RefreshFailed) => S::Anonymous,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }

    /// Whether a session (both tokens) is held.
    ///
    /// `Expired` and `Refreshing` still hold the session; requests made in those
    /// states wait for the refresh instead of being sent to login.
    pub fn has_session(self) -> bool {
        matches!(self, Self::Authenticated | Self::Expired | Self::Refreshing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "ANONYMOUS",
            Self::Authenticating => "AUTHENTICATING",
            Self::Authenticated => "AUTHENTICATED",
            Self::Expired => "EXPIRED",
            Self::Refreshing => "REFRESHING",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
