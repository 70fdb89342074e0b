// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process mock of the identity backend.
//!
//! Issues `A<n>`/`R<n>` token pairs, where `n` is the refresh generation, and
//! only accepts the newest access token on `/api/resource`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use astropass_session::{ApiClient, ClientConfig};

pub const USERNAME: &str = "nova";
pub const PASSWORD: &str = "secret1";

struct Tokens {
    generation: u32,
    /// Cleared by [`Backend::expire`], set again by a successful refresh.
    access_valid: bool,
}

impl Tokens {
    fn access(&self) -> String {
        format!("A{}", self.generation)
    }

    fn refresh(&self) -> String {
        format!("R{}", self.generation)
    }
}

pub struct Backend {
    tokens: Mutex<Tokens>,
    pub login_calls: AtomicU32,
    pub refresh_calls: AtomicU32,
    pub resource_calls: AtomicU32,
    /// Refresh tokens presented to `/auth/refresh`, in order.
    pub presented_refresh: Mutex<Vec<String>>,
    /// `Authorization` header of every `/resource` call ("" when absent).
    pub seen_bearers: Mutex<Vec<String>>,
    pub reject_refresh: AtomicBool,
    pub reject_resource: AtomicBool,
    pub refresh_delay: Mutex<Duration>,
    /// `expires_in` sent with login and refresh grants.
    pub expires_in: Mutex<Option<u64>>,
    pub logout_statuses: Mutex<VecDeque<Value>>,
    last_logout_status: Mutex<Value>,
}

impl Backend {
    fn new() -> Self {
        Self {
            tokens: Mutex::new(Tokens { generation: 1, access_valid: true }),
            login_calls: AtomicU32::new(0),
            refresh_calls: AtomicU32::new(0),
            resource_calls: AtomicU32::new(0),
            presented_refresh: Mutex::new(Vec::new()),
            seen_bearers: Mutex::new(Vec::new()),
            reject_refresh: AtomicBool::new(false),
            reject_resource: AtomicBool::new(false),
            refresh_delay: Mutex::new(Duration::ZERO),
            expires_in: Mutex::new(None),
            logout_statuses: Mutex::new(VecDeque::new()),
            last_logout_status: Mutex::new(Value::Null),
        }
    }

    /// Invalidate the current access token; the refresh token stays good.
    pub fn expire(&self) {
        self.tokens.lock().access_valid = false;
    }

    pub fn refreshes(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn resources(&self) -> u32 {
        self.resource_calls.load(Ordering::SeqCst)
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock() = delay;
    }

    pub fn queue_logout_statuses(&self, statuses: impl IntoIterator<Item = Value>) {
        self.logout_statuses.lock().extend(statuses);
    }
}

fn envelope(status: StatusCode, message: &str, data: Value) -> Response {
    (status, Json(json!({ "code": status.as_u16(), "message": message, "data": data })))
        .into_response()
}

fn ok(data: Value) -> Response {
    envelope(StatusCode::OK, "ok", data)
}

fn user() -> Value {
    json!({
        "id": 7,
        "uuid": "6f1c2a",
        "username": USERNAME,
        "email": "nova@example.com",
        "nickname": "",
        "roles": [
            { "id": 2, "name": "user", "display_name": "User" },
            { "id": 1, "name": "admin", "display_name": "Administrator" },
            { "id": 2, "name": "user", "display_name": "User" },
        ],
        "email_verified": true,
        "mfa_enabled": false,
        "status": "active",
    })
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.login_calls.fetch_add(1, Ordering::SeqCst);
    if body["username"] != USERNAME || body["password"] != PASSWORD {
        return envelope(StatusCode::UNAUTHORIZED, "invalid username or password", Value::Null);
    }
    let (access, refresh) = {
        let tokens = backend.tokens.lock();
        (tokens.access(), tokens.refresh())
    };
    let expires_in = *backend.expires_in.lock();
    ok(json!({
        "user": user(),
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "Bearer",
        "expires_in": expires_in,
    }))
}

async fn refresh(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let presented = body["refresh_token"].as_str().unwrap_or_default().to_owned();
    backend.presented_refresh.lock().push(presented.clone());

    let delay = *backend.refresh_delay.lock();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if backend.reject_refresh.load(Ordering::SeqCst) {
        return envelope(StatusCode::UNAUTHORIZED, "refresh token revoked", Value::Null);
    }

    let (access, refresh) = {
        let mut tokens = backend.tokens.lock();
        if presented != tokens.refresh() {
            return envelope(StatusCode::UNAUTHORIZED, "refresh token reused", Value::Null);
        }
        tokens.generation += 1;
        tokens.access_valid = true;
        (tokens.access(), tokens.refresh())
    };
    let expires_in = *backend.expires_in.lock();
    ok(json!({ "access_token": access, "refresh_token": refresh, "expires_in": expires_in }))
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn authorized(backend: &Backend, headers: &HeaderMap) -> bool {
    let tokens = backend.tokens.lock();
    tokens.access_valid && bearer(headers) == format!("Bearer {}", tokens.access())
}

async fn resource(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.resource_calls.fetch_add(1, Ordering::SeqCst);
    let auth = bearer(&headers);
    backend.seen_bearers.lock().push(auth.clone());
    if backend.reject_resource.load(Ordering::SeqCst) || !authorized(&backend, &headers) {
        return envelope(StatusCode::UNAUTHORIZED, "token expired", Value::Null);
    }
    ok(json!({ "bearer": auth }))
}

async fn profile(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !authorized(&backend, &headers) {
        return envelope(StatusCode::UNAUTHORIZED, "unauthenticated", Value::Null);
    }
    let mut user = user();
    user["nickname"] = json!("Nova Prime");
    user["mfa_enabled"] = json!(true);
    ok(user)
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        return envelope(StatusCode::CONFLICT, "username already exists", Value::Null);
    }
    ok(json!({ "user": { "id": 9, "username": body["username"] } }))
}

async fn sso_logout(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !authorized(&backend, &headers) {
        return envelope(StatusCode::UNAUTHORIZED, "unauthenticated", Value::Null);
    }
    ok(json!({ "request_id": "req-1", "status": "pending", "total_clients": 2 }))
}

async fn sso_status(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&backend, &headers) {
        return envelope(StatusCode::UNAUTHORIZED, "unauthenticated", Value::Null);
    }
    if id != "req-1" {
        return envelope(StatusCode::NOT_FOUND, "logout request not found", Value::Null);
    }
    let next = backend.logout_statuses.lock().pop_front();
    let mut last = backend.last_logout_status.lock();
    if let Some(status) = next {
        *last = status;
    }
    ok(last.clone())
}

/// Start the mock on a random port. Returns it with the API base URL.
pub async fn spawn() -> anyhow::Result<(Arc<Backend>, String)> {
    let backend = Arc::new(Backend::new());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/register", post(register))
        .route("/api/auth/profile", get(profile))
        .route("/api/resource", get(resource))
        .route("/api/sso/logout", post(sso_logout))
        .route("/api/sso/logout/{id}/status", get(sso_status))
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((backend, format!("http://{addr}/api")))
}

/// Memory-only client with proactive refresh disabled.
pub fn client(api_url: &str) -> anyhow::Result<ApiClient> {
    let config = ClientConfig { refresh_margin_secs: 0, ..ClientConfig::ephemeral(api_url) };
    Ok(ApiClient::new(config)?)
}

/// Client signed in as the canned user.
pub async fn signed_in(api_url: &str) -> anyhow::Result<ApiClient> {
    let client = client(api_url)?;
    client.login(USERNAME, PASSWORD).await?;
    Ok(client)
}
