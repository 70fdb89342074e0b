// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::session::Role;

fn user() -> User {
    User {
        id: 7,
        external_id: "u-7".into(),
        username: "nova".into(),
        email: "nova@example.com".into(),
        nickname: None,
        mfa_enabled: false,
        email_verified: true,
        roles: vec![Role { id: 2, name: "user".into(), display_name: "User".into() }],
        status: None,
    }
}

fn session(access: &str, refresh: &str, expires_at: Option<u64>) -> anyhow::Result<Session> {
    Ok(Session::new(user(), access.into(), refresh.into(), expires_at)?)
}

fn signed_in() -> anyhow::Result<SessionManager> {
    let manager = SessionManager::new(SessionStore::in_memory());
    let epoch = manager.begin_login()?;
    manager.establish(epoch, session("A1", "R1", None)?)?;
    Ok(manager)
}

#[test]
fn login_moves_anonymous_to_authenticated() -> anyhow::Result<()> {
    let manager = SessionManager::new(SessionStore::in_memory());
    assert_eq!(manager.state(), SessionState::Anonymous);

    let epoch = manager.begin_login()?;
    assert_eq!(manager.state(), SessionState::Authenticating);
    assert_eq!(manager.access_token(), None);

    manager.establish(epoch, session("A1", "R1", None)?)?;
    let snap = manager.snapshot();
    assert_eq!(snap.state, SessionState::Authenticated);
    assert_eq!(snap.access_token(), Some("A1"));
    Ok(())
}

#[test]
fn second_login_while_authenticating_is_refused() -> anyhow::Result<()> {
    let manager = SessionManager::new(SessionStore::in_memory());
    manager.begin_login()?;
    let err = manager.begin_login().err();
    assert!(matches!(err, Some(ClientError::Validation(_))));
    Ok(())
}

#[test]
fn failed_login_returns_to_anonymous() -> anyhow::Result<()> {
    let manager = SessionManager::new(SessionStore::in_memory());
    let epoch = manager.begin_login()?;
    manager.abort_login(epoch);
    assert_eq!(manager.state(), SessionState::Anonymous);
    Ok(())
}

#[test]
fn logout_during_login_cancels_it() -> anyhow::Result<()> {
    let manager = SessionManager::new(SessionStore::in_memory());
    let epoch = manager.begin_login()?;
    assert!(manager.clear());

    let err = manager.establish(epoch, session("A1", "R1", None)?).err();
    assert!(matches!(err, Some(ClientError::Authorization(_))));
    assert_eq!(manager.snapshot().session, None);
    assert_eq!(manager.state(), SessionState::Anonymous);
    Ok(())
}

#[test]
fn refresh_rotates_both_tokens() -> anyhow::Result<()> {
    let manager = signed_in()?;
    let ticket = manager.begin_refresh().ok_or_else(|| anyhow::anyhow!("no ticket"))?;
    assert_eq!(ticket.session.refresh_token(), "R1");
    assert_eq!(manager.state(), SessionState::Refreshing);

    let token = manager.complete_refresh(
        ticket.epoch,
        TokenGrant { access_token: "A2".into(), refresh_token: Some("R2".into()), expires_in: None },
    )?;
    assert_eq!(token, "A2");

    let snap = manager.snapshot();
    assert_eq!(snap.state, SessionState::Authenticated);
    let held = snap.session.ok_or_else(|| anyhow::anyhow!("session missing"))?;
    assert_eq!(held.access_token(), "A2");
    assert_eq!(held.refresh_token(), "R2");
    Ok(())
}

#[test]
fn refresh_result_after_logout_is_discarded() -> anyhow::Result<()> {
    let manager = signed_in()?;
    let ticket = manager.begin_refresh().ok_or_else(|| anyhow::anyhow!("no ticket"))?;
    manager.clear();

    let result = manager.complete_refresh(
        ticket.epoch,
        TokenGrant { access_token: "A2".into(), refresh_token: Some("R2".into()), expires_in: None },
    );
    assert!(matches!(result, Err(ClientError::Authorization(_))));
    assert_eq!(manager.snapshot().session, None);
    Ok(())
}

#[test]
fn clear_if_current_ignores_stale_epoch() -> anyhow::Result<()> {
    let manager = signed_in()?;
    let stale = manager.snapshot().epoch;
    manager.clear();
    let epoch = manager.begin_login()?;
    manager.establish(epoch, session("B1", "S1", None)?)?;

    assert!(!manager.clear_if_current(stale));
    assert_eq!(manager.access_token().as_deref(), Some("B1"));
    Ok(())
}

#[test]
fn clear_twice_leaves_identical_state() -> anyhow::Result<()> {
    let manager = signed_in()?;
    assert!(manager.clear());
    let first = manager.snapshot();
    assert!(!manager.clear());
    let second = manager.snapshot();

    assert_eq!(first.state, SessionState::Anonymous);
    assert_eq!(first.state, second.state);
    assert_eq!(first.epoch, second.epoch);
    assert_eq!(second.session, None);
    Ok(())
}

#[test]
fn token_inside_margin_is_marked_expired() -> anyhow::Result<()> {
    let manager = SessionManager::new(SessionStore::in_memory());
    let epoch = manager.begin_login()?;
    manager.establish(epoch, session("A1", "R1", Some(epoch_secs() + 10))?)?;

    assert_eq!(manager.token_status(None), TokenStatus::Fresh { token: "A1".into(), epoch });
    assert_eq!(manager.token_status(Some(30)), TokenStatus::NeedsRefresh);
    assert_eq!(manager.state(), SessionState::Expired);
    Ok(())
}

#[test]
fn anonymous_has_no_token() -> anyhow::Result<()> {
    let manager = SessionManager::new(SessionStore::in_memory());
    assert_eq!(manager.token_status(Some(30)), TokenStatus::Missing);
    assert!(manager.begin_refresh().is_none());
    Ok(())
}

#[test]
fn persisted_session_is_restored_on_startup() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    SessionStore::open(path.clone()).save(&session("A1", "R1", None)?);

    let manager = SessionManager::new(SessionStore::open(path.clone()));
    assert_eq!(manager.state(), SessionState::Authenticated);

    SessionStore::open(path.clone()).save(&session("A1", "R1", Some(1))?);
    let manager = SessionManager::new(SessionStore::open(path));
    assert_eq!(manager.state(), SessionState::Expired);
    Ok(())
}

#[test]
fn update_user_keeps_tokens() -> anyhow::Result<()> {
    let manager = signed_in()?;
    let epoch = manager.snapshot().epoch;
    let updated = manager.update_user(epoch, |u| u.nickname = Some("Star".into()));
    assert_eq!(updated.map(|u| u.display_name().to_owned()), Some("Star".to_owned()));

    let held = manager.snapshot().session.ok_or_else(|| anyhow::anyhow!("session missing"))?;
    assert_eq!(held.user().display_name(), "Star");
    assert_eq!(held.access_token(), "A1");
    Ok(())
}

#[test]
fn update_user_skips_a_later_session() -> anyhow::Result<()> {
    let manager = signed_in()?;
    let stale = manager.snapshot().epoch;
    manager.clear();
    let epoch = manager.begin_login()?;
    manager.establish(epoch, session("A9", "R9", None)?)?;

    assert_eq!(manager.update_user(stale, |u| u.mfa_enabled = true), None);
    assert_eq!(manager.user().map(|u| u.mfa_enabled), Some(false));
    Ok(())
}

#[test]
fn update_user_needs_a_session() -> anyhow::Result<()> {
    let manager = SessionManager::new(SessionStore::in_memory());
    let epoch = manager.snapshot().epoch;
    assert_eq!(manager.update_user(epoch, |u| u.mfa_enabled = true), None);
    Ok(())
}

#[test]
fn failed_refresh_signs_out() -> anyhow::Result<()> {
    let manager = signed_in()?;
    let ticket = manager.begin_refresh().ok_or_else(|| anyhow::anyhow!("no ticket"))?;
    assert_eq!(manager.state(), SessionState::Refreshing);

    assert!(manager.fail_refresh(ticket.epoch));
    assert_eq!(manager.state(), SessionState::Anonymous);
    assert!(manager.snapshot().session.is_none());
    assert!(manager.snapshot().epoch > ticket.epoch);
    assert!(!manager.fail_refresh(ticket.epoch));
    Ok(())
}

#[test]
fn failed_refresh_leaves_newer_session() -> anyhow::Result<()> {
    let manager = signed_in()?;
    let ticket = manager.begin_refresh().ok_or_else(|| anyhow::anyhow!("no ticket"))?;
    manager.clear();
    let epoch = manager.begin_login()?;
    manager.establish(epoch, session("A9", "R9", None)?)?;

    assert!(!manager.fail_refresh(ticket.epoch));
    assert_eq!(manager.state(), SessionState::Authenticated);
    assert_eq!(manager.access_token().as_deref(), Some("A9"));
    Ok(())
}
