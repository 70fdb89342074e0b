// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Astropass session core: persisted session, single-flight token refresh,
//! retry-once request interceptor, logout cascade and route gating for the
//! Astropass identity backend.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod logout;
pub mod refresh;
pub mod session;
pub mod transport;
pub mod validate;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use session::{SessionState, User};
