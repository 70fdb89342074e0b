// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth2 client registrations and consent grants.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::nullable_list;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::ApiRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClient {
    #[serde(default)]
    pub id: u64,
    pub client_id: String,
    pub client_name: String,
    #[serde(default)]
    pub client_uri: Option<String>,
    #[serde(default)]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Registration form for a new client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewOAuthClient {
    pub client_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    pub redirect_uris: Vec<String>,
}

/// A freshly created client. The secret is shown once and never again.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedClient {
    pub client_id: String,
    pub client_name: String,
    pub client_secret: String,
    #[serde(default)]
    pub status: String,
}

impl std::fmt::Debug for CreatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedClient")
            .field("client_id", &self.client_id)
            .field("client_name", &self.client_name)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// What a client asks for on the consent screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentInfo {
    pub client_name: String,
    #[serde(default)]
    pub client_uri: Option<String>,
    #[serde(default)]
    pub logo_uri: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub scopes: Vec<String>,
}

/// A consent the user has granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    pub id: u64,
    pub client_id: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn require(value: &str, what: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{what} is required")));
    }
    Ok(())
}

impl ApiClient {
    pub async fn list_clients(&self) -> Result<Vec<OAuthClient>, ClientError> {
        self.send_list(ApiRequest::get("/oauth2/clients")).await
    }

    pub async fn create_client(&self, client: &NewOAuthClient) -> Result<CreatedClient, ClientError> {
        require(&client.client_name, "client name")?;
        if client.redirect_uris.iter().all(|u| u.trim().is_empty()) {
            return Err(ClientError::Validation("at least one redirect uri is required".to_owned()));
        }
        let mut body = client.clone();
        body.redirect_uris.retain(|u| !u.trim().is_empty());
        let request = ApiRequest::post("/oauth2/clients")
            .json(serde_json::to_value(&body).map_err(|e| ClientError::Validation(e.to_string()))?);
        let created: CreatedClient = self.send_json(request).await?;
        tracing::info!(client_id = %created.client_id, "oauth2 client created");
        Ok(created)
    }

    pub async fn revoke_client(&self, client_id: &str) -> Result<String, ClientError> {
        require(client_id, "client id")?;
        self.send_ack(ApiRequest::delete(format!("/oauth2/clients/{client_id}")), "client revoked")
            .await
    }

    pub async fn consent_info(&self, client_id: &str) -> Result<ConsentInfo, ClientError> {
        require(client_id, "client id")?;
        self.send_json(ApiRequest::get("/oauth2/consent/info").query("client_id", client_id)).await
    }

    pub async fn approve_consent(&self, client_id: &str, scope: &str) -> Result<String, ClientError> {
        require(client_id, "client id")?;
        let request = ApiRequest::post("/oauth2/consent/approve")
            .json(json!({ "client_id": client_id, "scope": scope }));
        self.send_ack(request, "consent granted").await
    }

    pub async fn deny_consent(&self, client_id: &str, scope: &str) -> Result<String, ClientError> {
        require(client_id, "client id")?;
        let request = ApiRequest::post("/oauth2/consent/deny")
            .json(json!({ "client_id": client_id, "scope": scope }));
        self.send_ack(request, "consent denied").await
    }

    pub async fn list_consents(&self) -> Result<Vec<Consent>, ClientError> {
        self.send_list(ApiRequest::get("/oauth2/consent/list")).await
    }

    pub async fn revoke_consent(&self, client_id: &str) -> Result<String, ClientError> {
        require(client_id, "client id")?;
        self.send_ack(ApiRequest::delete(format!("/oauth2/consent/{client_id}")), "consent revoked")
            .await
    }
}
