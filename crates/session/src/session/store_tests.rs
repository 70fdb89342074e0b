// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use proptest::prelude::*;

use super::*;
use crate::session::{Role, User};

fn user_with_roles(roles: Vec<Role>) -> User {
    User {
        id: 1,
        external_id: "0f6c".into(),
        username: "nova".into(),
        email: "nova@example.com".into(),
        nickname: Some("Nova".into()),
        mfa_enabled: true,
        email_verified: false,
        roles,
        status: Some("active".into()),
    }
}

fn session() -> anyhow::Result<Session> {
    let roles = vec![
        Role { id: 3, name: "auditor".into(), display_name: "Auditor".into() },
        Role { id: 1, name: "admin".into(), display_name: "Admin".into() },
    ];
    Ok(Session::new(user_with_roles(roles), "A1".into(), "R1".into(), Some(1_900_000_000))?)
}

#[test]
fn save_then_reopen_round_trips() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    let original = session()?;

    let store = SessionStore::open(path.clone());
    assert_eq!(store.save(&original), Persistence::Durable);

    let reopened = SessionStore::open(path);
    assert_eq!(reopened.load(), Some(original));
    Ok(())
}

#[test]
fn record_uses_single_camel_case_document() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    SessionStore::open(path.clone()).save(&session()?);

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(raw["accessToken"], "A1");
    assert_eq!(raw["refreshToken"], "R1");
    assert_eq!(raw["authenticated"], true);
    assert_eq!(raw["user"]["uuid"], "0f6c");
    Ok(())
}

#[test]
fn clear_is_idempotent() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    let store = SessionStore::open(path.clone());
    store.save(&session()?);

    assert_eq!(store.clear(), Persistence::Durable);
    assert_eq!(store.load(), None);
    assert!(!path.exists());
    assert_eq!(store.clear(), Persistence::Durable);
    assert_eq!(store.load(), None);
    Ok(())
}

#[yare::parameterized(
    garbage = { "{not json" },
    null_tokens = { r#"{"user":null,"accessToken":null,"refreshToken":null,"authenticated":false}"# },
    claims_auth_without_tokens = { r#"{"authenticated":true}"# },
    empty_access = { r#"{"user":{"id":1,"username":"x"},"accessToken":"","refreshToken":"R","authenticated":true}"# },
)]
fn unusable_record_loads_as_empty(contents: &str) {
    let Ok(dir) = tempfile::tempdir() else { return };
    let path = dir.path().join("session.json");
    assert!(std::fs::write(&path, contents).is_ok());
    let store = SessionStore::open(path);
    assert_eq!(store.load(), None);
    assert!(matches!(store.health(), StoreHealth::Durable { .. }));
}

#[test]
fn write_failure_degrades_to_memory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    // Parent of the record is a regular file, so every write fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x")?;
    let store = SessionStore::open(blocker.join("session.json"));

    let s = session()?;
    assert_eq!(store.save(&s), Persistence::MemoryOnly);
    assert_eq!(store.load(), Some(s.clone()));
    assert!(matches!(store.health(), StoreHealth::Degraded { .. }));

    // Stays memory-only for the rest of the process.
    assert_eq!(store.save(&s), Persistence::MemoryOnly);
    assert_eq!(store.clear(), Persistence::MemoryOnly);
    assert_eq!(store.load(), None);
    Ok(())
}

#[test]
fn in_memory_store_never_touches_disk() -> anyhow::Result<()> {
    let store = SessionStore::in_memory();
    assert_eq!(store.save(&session()?), Persistence::MemoryOnly);
    assert_eq!(store.health(), StoreHealth::Ephemeral);
    assert!(store.load().is_some());
    Ok(())
}

fn arb_roles() -> impl Strategy<Value = Vec<Role>> {
    prop::collection::vec((0u64..50, "[a-z]{1,8}"), 0..8).prop_map(|items| {
        items
            .into_iter()
            .map(|(id, name)| Role { id, display_name: name.to_uppercase(), name })
            .collect()
    })
}

proptest! {
    #[test]
    fn role_order_survives_persistence(roles in arb_roles()) {
        let dir = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let path = dir.path().join("session.json");
        let original = Session::new(user_with_roles(roles), "A".into(), "R".into(), None)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        SessionStore::open(path.clone()).save(&original);
        prop_assert_eq!(SessionStore::open(path).load(), Some(original));
    }
}
