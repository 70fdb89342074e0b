// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authoritative session holder: the store and the state machine behind one lock.
//!
//! Every mutation takes the ledger write lock before touching the store, and
//! readers take the ledger read lock before loading, so no reader can see
//! `Authenticated` next to an empty store. Lock order is always ledger, then
//! store.
//!
//! The ledger also carries an epoch that changes whenever a session begins or
//! ends. Work started against one epoch (a login, a refresh) can only commit
//! while that epoch is still current.

use parking_lot::RwLock;

use crate::error::ClientError;
use crate::session::state::{SessionEvent, SessionState};
use crate::session::store::{Persistence, SessionStore, StoreHealth};
use crate::session::{epoch_secs, Session, TokenGrant, User};

struct Ledger {
    state: SessionState,
    epoch: u64,
}

impl Ledger {
    fn apply(&mut self, event: SessionEvent) -> Result<SessionState, ClientError> {
        match self.state.on(event) {
            Ok(next) => {
                if next != self.state {
                    tracing::debug!(from = %self.state, to = %next, ?event, "session transition");
                }
                self.state = next;
                Ok(next)
            }
            Err(e) => {
                tracing::debug!(err = %e, "session transition refused");
                Err(ClientError::Validation(e.to_string()))
            }
        }
    }
}

/// Consistent point-in-time view of the session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub epoch: u64,
    pub session: Option<Session>,
}

impl SessionSnapshot {
    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(Session::access_token)
    }
}

/// What the refresh coordinator should do with the current token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Fresh { token: String, epoch: u64 },
    NeedsRefresh,
    Missing,
}

/// A refresh that has been started against a specific session.
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    pub epoch: u64,
    pub session: Session,
}

pub struct SessionManager {
    store: SessionStore,
    ledger: RwLock<Ledger>,
}

impl SessionManager {
    /// Wrap a store, seeding the state from whatever it loaded.
    pub fn new(store: SessionStore) -> Self {
        let state = match store.load() {
            Some(s) if s.is_expiring(epoch_secs(), 0) => SessionState::Expired,
            Some(_) => SessionState::Authenticated,
            None => SessionState::Anonymous,
        };
        if state.has_session() {
            tracing::info!(%state, "restored persisted session");
        }
        Self { store, ledger: RwLock::new(Ledger { state, epoch: 0 }) }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let ledger = self.ledger.read();
        SessionSnapshot { state: ledger.state, epoch: ledger.epoch, session: self.store.load() }
    }

    pub fn state(&self) -> SessionState {
        self.ledger.read().state
    }

    pub fn user(&self) -> Option<User> {
        let _ledger = self.ledger.read();
        self.store.load().map(|s| s.user().clone())
    }

    pub fn access_token(&self) -> Option<String> {
        let _ledger = self.ledger.read();
        self.store.load().map(|s| s.access_token().to_owned())
    }

    pub fn store_health(&self) -> StoreHealth {
        self.store.health()
    }

    /// Enter `Authenticating`. Returns the epoch the login must commit under.
    pub fn begin_login(&self) -> Result<u64, ClientError> {
        let mut ledger = self.ledger.write();
        ledger.apply(SessionEvent::LoginStarted).map_err(|_| {
            ClientError::Validation(format!("cannot sign in while {}", ledger.state))
        })?;
        ledger.epoch += 1;
        Ok(ledger.epoch)
    }

    /// Commit a successful login. Fails if the attempt was superseded by a logout.
    pub fn establish(&self, epoch: u64, session: Session) -> Result<Persistence, ClientError> {
        let mut ledger = self.ledger.write();
        if ledger.epoch != epoch || ledger.state != SessionState::Authenticating {
            return Err(ClientError::Authorization("sign-in was cancelled".to_owned()));
        }
        let persistence = self.store.save(&session);
        ledger.apply(SessionEvent::LoginSucceeded)?;
        tracing::info!(user = %session.user().username, "session established");
        Ok(persistence)
    }

    /// Return to `Anonymous` after a failed login attempt.
    pub fn abort_login(&self, epoch: u64) {
        let mut ledger = self.ledger.write();
        if ledger.epoch == epoch && ledger.state == SessionState::Authenticating {
            let _ = ledger.apply(SessionEvent::LoginFailed);
        }
    }

    /// Classify the current access token, moving to `Expired` when it is inside `margin_secs`.
    pub fn token_status(&self, margin_secs: Option<u64>) -> TokenStatus {
        let mut ledger = self.ledger.write();
        let Some(session) = self.store.load() else {
            return TokenStatus::Missing;
        };
        match ledger.state {
            SessionState::Authenticated => {
                let expiring =
                    margin_secs.is_some_and(|m| session.is_expiring(epoch_secs(), m));
                if !expiring {
                    let token = session.access_token().to_owned();
                    return TokenStatus::Fresh { token, epoch: ledger.epoch };
                }
                let _ = ledger.apply(SessionEvent::TokenExpired);
                TokenStatus::NeedsRefresh
            }
            SessionState::Expired | SessionState::Refreshing => TokenStatus::NeedsRefresh,
            SessionState::Anonymous | SessionState::Authenticating => TokenStatus::Missing,
        }
    }

    /// Enter `Refreshing` and hand out the session to refresh.
    pub fn begin_refresh(&self) -> Option<RefreshTicket> {
        let mut ledger = self.ledger.write();
        let session = self.store.load()?;
        ledger.apply(SessionEvent::RefreshStarted).ok()?;
        Some(RefreshTicket { epoch: ledger.epoch, session })
    }

    /// Commit refreshed tokens. Returns the new access token.
    pub fn complete_refresh(&self, epoch: u64, grant: TokenGrant) -> Result<String, ClientError> {
        let mut ledger = self.ledger.write();
        if ledger.epoch != epoch || ledger.state != SessionState::Refreshing {
            return Err(ClientError::Authorization("session ended during refresh".to_owned()));
        }
        let current = self
            .store
            .load()
            .ok_or_else(|| ClientError::Authorization("session ended during refresh".to_owned()))?;
        let rotated = current.rotated(grant)?;
        self.store.save(&rotated);
        ledger.apply(SessionEvent::RefreshSucceeded)?;
        Ok(rotated.access_token().to_owned())
    }

    /// Edit the user record of the session `epoch` belongs to, under one write.
    ///
    /// Returns the updated user, or `None` if that session has ended.
    pub fn update_user(&self, epoch: u64, edit: impl FnOnce(&mut User)) -> Option<User> {
        let ledger = self.ledger.write();
        if ledger.epoch != epoch || !ledger.state.has_session() {
            return None;
        }
        let session = self.store.load()?;
        let mut user = session.user().clone();
        edit(&mut user);
        self.store.save(&session.with_user(user.clone()));
        Some(user)
    }

    /// Drop the session and return to `Anonymous`. Returns whether anything was held.
    pub fn clear(&self) -> bool {
        let mut ledger = self.ledger.write();
        self.clear_locked(&mut ledger)
    }

    /// Like [`clear`](Self::clear), but only if `epoch` is still the current session.
    pub fn clear_if_current(&self, epoch: u64) -> bool {
        let mut ledger = self.ledger.write();
        if ledger.epoch != epoch {
            return false;
        }
        self.clear_locked(&mut ledger)
    }

    /// End the session `epoch` belongs to after its refresh failed.
    pub fn fail_refresh(&self, epoch: u64) -> bool {
        let mut ledger = self.ledger.write();
        if ledger.epoch != epoch {
            return false;
        }
        if ledger.state != SessionState::Refreshing {
            return self.clear_locked(&mut ledger);
        }
        self.store.clear();
        let _ = ledger.apply(SessionEvent::RefreshFailed);
        ledger.epoch += 1;
        true
    }

    fn clear_locked(&self, ledger: &mut Ledger) -> bool {
        let held = ledger.state != SessionState::Anonymous || self.store.load().is_some();
        if !held {
            return false;
        }
        self.store.clear();
        let _ = ledger.apply(SessionEvent::LoggedOut);
        ledger.epoch += 1;
        true
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
