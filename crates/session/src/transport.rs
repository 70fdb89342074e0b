// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw HTTP exchange with the backend.
//!
//! Every backend response is a `{code, message, data}` envelope. The transport
//! unwraps it and classifies failures into [`ClientError`]; it knows nothing
//! about sessions. Token attachment, refresh and retry live in
//! [`crate::client::ApiClient`].

use std::sync::Once;
use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::session::TokenGrant;

static CRYPTO_PROVIDER: Once = Once::new();

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Sent without credentials (login, register, refresh, password reset).
    Public,
    Bearer,
}

/// A backend call, described independently of any session.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub access: Access,
    /// Set once the request has been replayed after a refresh.
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            access: Access::Bearer,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    pub fn public(mut self) -> Self {
        self.access = Access::Public;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// A successful, unwrapped backend response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl ApiResponse {
    /// Decode the `data` payload into `T`.
    pub fn data<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let value = self.data.unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| ClientError::malformed(self.status, e))
    }

    /// Backend message, falling back to `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_owned(),
            _ => fallback.to_owned(),
        }
    }
}

/// Shared HTTP client bound to one backend base URL.
#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    base_url: String,
}

impl Transport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        CRYPTO_PROVIDER.call_once(|| {
            let _ = rustls::crypto::ring::default_provider().install_default();
        });
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build http client: {e}")))?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, request: &ApiRequest) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.base_url, request.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::Validation(format!("invalid url {raw}: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    /// Send `request` once, attaching `token` when the request is bearer-authenticated.
    pub async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let mut builder = self.client.request(request.method.clone(), self.url(request)?);
        if request.access == Access::Bearer {
            if let Some(token) = token {
                builder = builder.bearer_auth(token);
            }
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| {
            tracing::debug!(method = %request.method, path = %request.path, err = %e, "request failed");
            ClientError::from_reqwest(&e)
        })?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| ClientError::from_reqwest(&e))?;
        tracing::debug!(method = %request.method, path = %request.path, status = status.as_u16(), "response");

        let public = request.access == Access::Public;
        let envelope = if bytes.is_empty() {
            Envelope::default()
        } else {
            match serde_json::from_slice::<Envelope>(&bytes) {
                Ok(env) => env,
                Err(e) if status.is_success() => {
                    return Err(ClientError::malformed(status.as_u16(), e));
                }
                Err(_) => return Err(ClientError::from_status(status.as_u16(), None, public)),
            }
        };

        if !status.is_success() {
            return Err(ClientError::from_status(
                status.as_u16(),
                envelope.message.as_deref(),
                public,
            ));
        }
        // Some handlers answer 200 with an error code in the envelope.
        if let Some(code) = envelope.code.filter(|c| (400..600).contains(c)) {
            let code = u16::try_from(code).unwrap_or(500);
            return Err(ClientError::from_status(code, envelope.message.as_deref(), public));
        }

        Ok(ApiResponse { status: status.as_u16(), message: envelope.message, data: envelope.data })
    }

    /// Exchange a refresh token for a new token pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ClientError> {
        let request = ApiRequest::post("/auth/refresh")
            .public()
            .json(serde_json::json!({ "refresh_token": refresh_token }));
        self.dispatch(&request, None).await?.data()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
