// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session record persistence: load/save one JSON file with atomic writes.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::session::{Session, User};

/// On-disk shape of the session record.
///
/// `authenticated` is written for readers of the file but never trusted on
/// load; it is derived from the tokens.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            user: Some(session.user().clone()),
            access_token: Some(session.access_token().to_owned()),
            refresh_token: Some(session.refresh_token().to_owned()),
            authenticated: true,
            expires_at: session.expires_at(),
        }
    }
}

impl PersistedSession {
    /// Convert back into a session. Records missing the user or either token are empty.
    pub fn into_session(self) -> Option<Session> {
        let user = self.user?;
        let access = self.access_token.filter(|t| !t.is_empty())?;
        let refresh = self.refresh_token.filter(|t| !t.is_empty())?;
        Session::new(user, access, refresh, self.expires_at).ok()
    }
}

/// Errors reading the record.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed session record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Load the record. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<PersistedSession>, LoadError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let record: PersistedSession = serde_json::from_str(&contents)?;
    Ok(Some(record))
}

/// Save the record atomically (write tmp + rename).
///
/// The temp name carries the PID and a counter so concurrent saves never
/// share a temp file.
pub fn save(path: &Path, record: &PersistedSession) -> io::Result<()> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let json = serde_json::to_string_pretty(record).map_err(io::Error::other)?;
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, json)?;
    // Tokens inside; owner-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Remove the record. A missing file counts as removed.
pub fn remove(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
