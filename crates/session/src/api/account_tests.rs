// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::*;
use crate::session::Role;

fn stored() -> User {
    User {
        id: 4,
        external_id: "u-4".into(),
        username: "nova".into(),
        email: "nova@example.com".into(),
        nickname: Some("Nova".into()),
        mfa_enabled: true,
        email_verified: true,
        roles: vec![Role { id: 1, name: "admin".into(), display_name: "Admin".into() }],
        status: Some("active".into()),
    }
}

#[test]
fn profile_update_keeps_roles_and_flags() -> anyhow::Result<()> {
    let data: ProfileData = serde_json::from_value(json!({
        "user": { "id": 4, "uuid": "u-4", "username": "nova", "email": "nova@example.com", "nickname": "Star" }
    }))?;
    let user = data.user.apply_to(stored());
    assert_eq!(user.nickname.as_deref(), Some("Star"));
    assert_eq!(user.role_names(), ["admin"]);
    assert!(user.mfa_enabled);
    assert_eq!(user.status.as_deref(), Some("active"));
    Ok(())
}

#[test]
fn cleared_nickname_becomes_absent() -> anyhow::Result<()> {
    let data: ProfileData = serde_json::from_value(json!({
        "user": { "id": 4, "username": "nova", "nickname": "" }
    }))?;
    let user = data.user.apply_to(stored());
    assert_eq!(user.nickname, None);
    assert_eq!(user.display_name(), "nova");
    assert_eq!(user.email, "nova@example.com");
    Ok(())
}

#[test]
fn null_recovery_codes_decode_empty() -> anyhow::Result<()> {
    let data: RecoveryCodes = serde_json::from_value(json!({ "recovery_codes": null }))?;
    assert!(data.recovery_codes.is_empty());
    Ok(())
}
