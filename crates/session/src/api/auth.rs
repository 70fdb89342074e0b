// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sign-in, registration and password recovery.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::session::{Session, TokenGrant, User};
use crate::transport::ApiRequest;
use crate::validate;

#[derive(Debug, Deserialize)]
struct LoginData {
    user: User,
    #[serde(flatten)]
    grant: TokenGrant,
}

/// Registration form. `confirm_password` never leaves the client.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub nickname: Option<String>,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    nickname: Option<&'a str>,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.username.trim().is_empty() {
            return Err(ClientError::Validation("username is required".to_owned()));
        }
        validate::email(&self.email)?;
        validate::new_password(&self.password, &self.confirm_password)
    }
}

impl ApiClient {
    /// Sign in, replacing any session currently held.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        validate::credentials(username, password)?;
        if self.state().has_session() {
            self.logout_local();
        }

        let epoch = self.sessions().begin_login()?;
        match self.exchange_credentials(username, password).await {
            Ok(session) => {
                let user = session.user().clone();
                self.sessions().establish(epoch, session)?;
                Ok(user)
            }
            Err(e) => {
                tracing::debug!(err = %e, "sign-in failed");
                self.sessions().abort_login(epoch);
                Err(e)
            }
        }
    }

    async fn exchange_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let request = ApiRequest::post("/auth/login")
            .public()
            .json(json!({ "username": username.trim(), "password": password }));
        let data: LoginData = self.send_json(request).await?;
        Session::from_grant(data.user.normalized(), data.grant)
    }

    /// Create an account, then sign in with it.
    pub async fn register(&self, account: &NewAccount) -> Result<User, ClientError> {
        account.validate()?;
        let body = RegisterBody {
            username: account.username.trim(),
            email: account.email.trim(),
            password: &account.password,
            nickname: account.nickname.as_deref().map(str::trim).filter(|n| !n.is_empty()),
        };
        let request = ApiRequest::post("/auth/register")
            .public()
            .json(serde_json::to_value(&body).map_err(|e| ClientError::Validation(e.to_string()))?);
        self.send(request).await?;
        tracing::info!(username = %body.username, "account registered");
        self.login(&account.username, &account.password).await
    }

    /// Request a password-reset email. Returns the backend's acknowledgement.
    pub async fn forgot_password(&self, email: &str) -> Result<String, ClientError> {
        validate::email(email)?;
        let request =
            ApiRequest::post("/auth/forgot-password").public().json(json!({ "email": email.trim() }));
        self.send_ack(request, "reset email sent").await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String, ClientError> {
        validate::reset_token(token)?;
        validate::new_password(new_password, confirm_password)?;
        let request = ApiRequest::post("/auth/reset-password")
            .public()
            .json(json!({ "token": token.trim(), "new_password": new_password }));
        self.send_ack(request, "password reset").await
    }

    /// Fetch the signed-in user and replace the stored record with it.
    pub async fn fetch_profile(&self) -> Result<User, ClientError> {
        let epoch = self.snapshot().epoch;
        let user: User = self.send_json(ApiRequest::get("/auth/profile")).await?;
        let user = user.normalized();
        self.sessions().update_user(epoch, |held| *held = user.clone());
        Ok(user)
    }
}
