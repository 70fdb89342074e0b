// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed backend boundary.
//!
//! One record per endpoint payload, decoded at the edge so that nothing past
//! this module handles raw JSON. Every call goes through
//! [`ApiClient::send`](crate::client::ApiClient::send).

pub mod account;
pub mod admin;
pub mod auth;
pub mod oauth2;
pub mod sessions;

use serde::{Deserialize, Deserializer};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::ApiRequest;

/// Decode a list field the backend may send as `null`.
pub(crate) fn nullable_list<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
}

impl ApiClient {
    /// Send a request whose `data` is a bare list, treating `null` as empty.
    pub(crate) async fn send_list<T>(&self, request: ApiRequest) -> Result<Vec<T>, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let items: Option<Vec<T>> = self.send_json(request).await?;
        Ok(items.unwrap_or_default())
    }
}
