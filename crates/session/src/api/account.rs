// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile, password and MFA settings of the signed-in user.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::nullable_list;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::session::User;
use crate::transport::ApiRequest;
use crate::validate;

/// Identity fields returned by a profile update. Roles and flags are not included.
#[derive(Debug, Clone, Deserialize)]
struct ProfileFields {
    id: u64,
    #[serde(rename = "uuid", default)]
    external_id: String,
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    user: ProfileFields,
}

impl ProfileFields {
    /// Overlay onto the stored user, keeping what the backend did not send.
    fn apply_to(self, mut user: User) -> User {
        user.id = self.id;
        if !self.external_id.is_empty() {
            user.external_id = self.external_id;
        }
        user.username = self.username;
        if !self.email.is_empty() {
            user.email = self.email;
        }
        user.nickname = self.nickname;
        user.normalized()
    }
}

/// Secret and provisioning URL for a new authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfaSetup {
    pub secret: String,
    pub qr_code_url: String,
}

#[derive(Debug, Deserialize)]
struct RecoveryCodes {
    #[serde(default, deserialize_with = "nullable_list")]
    recovery_codes: Vec<String>,
}

impl ApiClient {
    /// Change the nickname. Returns the updated user, which also replaces the stored one.
    pub async fn update_profile(&self, nickname: &str) -> Result<User, ClientError> {
        let epoch = self.snapshot().epoch;
        let request = ApiRequest::put("/user/profile").json(json!({ "nickname": nickname.trim() }));
        let data: ProfileData = self.send_json(request).await?;
        self.sessions()
            .update_user(epoch, |user| *user = data.user.apply_to(user.clone()))
            .ok_or_else(|| ClientError::Authorization("session ended".to_owned()))
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String, ClientError> {
        if old_password.is_empty() {
            return Err(ClientError::Validation("current password is required".to_owned()));
        }
        validate::new_password(new_password, confirm_password)?;
        let request = ApiRequest::post("/user/change-password")
            .json(json!({ "old_password": old_password, "new_password": new_password }));
        self.send_ack(request, "password changed").await
    }

    pub async fn generate_mfa(&self) -> Result<MfaSetup, ClientError> {
        self.send_json(ApiRequest::post("/mfa/generate")).await
    }

    /// Confirm the authenticator with `code`. Returns the one-time recovery codes.
    pub async fn enable_mfa(&self, code: &str) -> Result<Vec<String>, ClientError> {
        validate::mfa_code(code)?;
        let epoch = self.snapshot().epoch;
        let request = ApiRequest::post("/mfa/enable").json(json!({ "code": code }));
        let data: RecoveryCodes = self.send_json(request).await?;
        self.sessions().update_user(epoch, |user| user.mfa_enabled = true);
        Ok(data.recovery_codes)
    }

    pub async fn disable_mfa(&self, code: &str) -> Result<String, ClientError> {
        validate::mfa_code(code)?;
        let epoch = self.snapshot().epoch;
        let request = ApiRequest::post("/mfa/disable").json(json!({ "code": code }));
        let message = self.send_ack(request, "mfa disabled").await?;
        self.sessions().update_user(epoch, |user| user.mfa_enabled = false);
        Ok(message)
    }

    pub async fn recovery_codes(&self) -> Result<Vec<String>, ClientError> {
        let data: RecoveryCodes = self.send_json(ApiRequest::get("/mfa/recovery-codes")).await?;
        Ok(data.recovery_codes)
    }
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
