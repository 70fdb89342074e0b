// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent session store.
//!
//! Keeps the current session in memory and mirrors it to a single JSON record
//! on disk. `save` and `clear` hold the write lock for the whole update, so a
//! concurrent `load` sees either the old or the new session, never a mix.
//! Disk failures never propagate: the store switches to memory-only for the
//! rest of the process and reports that through [`Persistence`] and
//! [`StoreHealth`].

use std::path::PathBuf;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::session::persist::{self, PersistedSession};
use crate::session::Session;

/// Where a write ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Written to disk.
    Durable,
    /// Held in memory only (ephemeral store, or disk degraded).
    MemoryOnly,
}

/// Health of the backing storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreHealth {
    Durable { path: PathBuf },
    /// Configured without disk.
    Ephemeral,
    /// A disk write failed; the session lives in memory until the process exits.
    Degraded { path: PathBuf, reason: String },
}

enum Backend {
    File(PathBuf),
    Memory,
}

pub struct SessionStore {
    current: RwLock<Option<Session>>,
    backend: Mutex<Backend>,
    health: RwLock<StoreHealth>,
}

impl SessionStore {
    /// Open a file-backed store and seed it from the record at `path`.
    ///
    /// A missing, unreadable or malformed record yields an empty (logged-out) store.
    pub fn open(path: PathBuf) -> Self {
        let seeded = match persist::load(&path) {
            Ok(Some(record)) => {
                let session = record.into_session();
                if session.is_none() {
                    tracing::debug!(path = %path.display(), "session record holds no usable session");
                }
                session
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), err = %e, "ignoring unreadable session record");
                None
            }
        };
        Self {
            current: RwLock::new(seeded),
            health: RwLock::new(StoreHealth::Durable { path: path.clone() }),
            backend: Mutex::new(Backend::File(path)),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            backend: Mutex::new(Backend::Memory),
            health: RwLock::new(StoreHealth::Ephemeral),
        }
    }

    /// Open at `path`, or in memory when `None`.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    pub fn load(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn save(&self, session: &Session) -> Persistence {
        let mut current = self.current.write();
        *current = Some(session.clone());
        let record = PersistedSession::from(session);
        self.write_through(|path| persist::save(path, &record))
    }

    pub fn clear(&self) -> Persistence {
        let mut current = self.current.write();
        *current = None;
        self.write_through(|path| persist::remove(path))
    }

    pub fn health(&self) -> StoreHealth {
        self.health.read().clone()
    }

    /// Run a disk operation against the file backend, degrading on failure.
    ///
    /// Callers hold the `current` write lock so disk order matches memory order.
    fn write_through(
        &self,
        op: impl FnOnce(&std::path::Path) -> std::io::Result<()>,
    ) -> Persistence {
        let mut backend = self.backend.lock();
        let Backend::File(ref path) = *backend else {
            return Persistence::MemoryOnly;
        };
        match op(path) {
            Ok(()) => Persistence::Durable,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    err = %e,
                    "session storage failed, keeping session in memory only"
                );
                *self.health.write() =
                    StoreHealth::Degraded { path: path.clone(), reason: e.to_string() };
                *backend = Backend::Memory;
                Persistence::MemoryOnly
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
