// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight access token refresh.
//!
//! At most one refresh call is outstanding per session. The first caller that
//! needs a refresh spawns it; everyone arriving while it runs subscribes to the
//! same outcome. The refresh runs on its own task so it completes even if the
//! caller that started it is dropped.
//!
//! Lock order: `inflight`, then the session ledger.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::ClientError;
use crate::session::manager::{RefreshTicket, TokenStatus};
use crate::session::{SessionManager, SessionState};
use crate::transport::Transport;

/// An access token together with the session epoch it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshToken {
    pub token: String,
    pub epoch: u64,
}

type Outcome = Result<FreshToken, ClientError>;

struct InFlight {
    id: u64,
    result: watch::Receiver<Option<Outcome>>,
}

struct Inner {
    sessions: Arc<SessionManager>,
    transport: Transport,
    inflight: Mutex<Option<InFlight>>,
    timeout: Duration,
    /// Proactive refresh margin; `None` refreshes only on rejection.
    margin_secs: Option<u64>,
    next_id: AtomicU64,
}

/// Coordinates token refreshes for one session.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(
        sessions: Arc<SessionManager>,
        transport: Transport,
        timeout: Duration,
        margin: Duration,
    ) -> Self {
        let margin_secs = Some(margin.as_secs()).filter(|s| *s > 0);
        Self {
            inner: Arc::new(Inner {
                sessions,
                transport,
                inflight: Mutex::new(None),
                timeout,
                margin_secs,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Whether a refresh call is currently outstanding.
    pub fn in_flight(&self) -> bool {
        self.inner.inflight.lock().is_some()
    }

    /// Return an access token fit to send, refreshing first if it is stale.
    ///
    /// Joins an outstanding refresh instead of sending with a token that is
    /// about to be replaced.
    pub async fn ensure_valid_token(&self) -> Result<FreshToken, ClientError> {
        let rx = {
            let mut inflight = self.inner.inflight.lock();
            match inflight.as_ref() {
                Some(running) => running.result.clone(),
                None => match self.inner.sessions.token_status(self.inner.margin_secs) {
                    TokenStatus::Fresh { token, epoch } => return Ok(FreshToken { token, epoch }),
                    TokenStatus::Missing => {
                        return Err(ClientError::Authorization("not signed in".to_owned()));
                    }
                    TokenStatus::NeedsRefresh => self.start_locked(&mut inflight)?,
                },
            }
        };
        wait(rx).await
    }

    /// Obtain a replacement for `rejected`, an access token the backend answered 401 to.
    ///
    /// If another refresh already replaced it, the current token is returned
    /// without a new refresh call.
    pub async fn refresh_after_unauthorized(
        &self,
        rejected: Option<&str>,
    ) -> Result<FreshToken, ClientError> {
        let rx = {
            let mut inflight = self.inner.inflight.lock();
            match inflight.as_ref() {
                Some(running) => running.result.clone(),
                None => {
                    let snap = self.inner.sessions.snapshot();
                    match snap.access_token() {
                        None => {
                            return Err(ClientError::Authorization("session ended".to_owned()));
                        }
                        Some(current)
                            if snap.state == SessionState::Authenticated
                                && Some(current) != rejected =>
                        {
                            return Ok(FreshToken { token: current.to_owned(), epoch: snap.epoch });
                        }
                        Some(_) => self.start_locked(&mut inflight)?,
                    }
                }
            }
        };
        wait(rx).await
    }

    fn start_locked(
        &self,
        slot: &mut Option<InFlight>,
    ) -> Result<watch::Receiver<Option<Outcome>>, ClientError> {
        let ticket = self
            .inner
            .sessions
            .begin_refresh()
            .ok_or_else(|| ClientError::Authorization("no session to refresh".to_owned()))?;
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(None);
        *slot = Some(InFlight { id, result: rx.clone() });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner.run(ticket).await;
            let mut slot = inner.inflight.lock();
            if slot.as_ref().is_some_and(|f| f.id == id) {
                *slot = None;
            }
            tx.send_replace(Some(outcome));
        });
        Ok(rx)
    }
}

impl Inner {
    async fn run(&self, ticket: RefreshTicket) -> Outcome {
        tracing::debug!(epoch = ticket.epoch, "refreshing access token");
        let call = self.transport.refresh(ticket.session.refresh_token());
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(grant)) => self
                .sessions
                .complete_refresh(ticket.epoch, grant)
                .map(|token| FreshToken { token, epoch: ticket.epoch }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ClientError::Network("token refresh timed out".to_owned())),
        };
        match result {
            Ok(fresh) => {
                tracing::info!("access token refreshed");
                Ok(fresh)
            }
            Err(e) => {
                tracing::warn!(err = %e, "token refresh failed, signing out");
                self.sessions.fail_refresh(ticket.epoch);
                Err(ClientError::Authorization(format!("session refresh failed: {e}")))
            }
        }
    }
}

async fn wait(mut rx: watch::Receiver<Option<Outcome>>) -> Outcome {
    let outcome = match rx.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone(),
        Err(_) => None,
    };
    outcome.unwrap_or_else(|| Err(ClientError::Authorization("refresh aborted".to_owned())))
}
