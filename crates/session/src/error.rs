// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Maximum number of backend message characters surfaced to callers.
const MAX_MESSAGE_CHARS: usize = 200;

/// Errors surfaced to the calling UI action.
///
/// `Clone` so that one refresh outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Rejected on the client before anything was sent.
    #[error("{0}")]
    Validation(String),
    /// The presented credential was missing, expired or revoked (401 on a bearer call).
    #[error("authorization failed: {0}")]
    Authorization(String),
    /// Login or refresh credentials were rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),
    /// No response arrived (connect failure, timeout, broken body).
    #[error("network error: {0}")]
    Network(String),
    /// 5xx-class response, or a 2xx whose payload did not match its record.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// Any other 4xx-class response.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ClientError {
    /// Machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::Authorization(_) => "UNAUTHORIZED",
            Self::AuthenticationFailure(_) => "AUTHENTICATION_FAILED",
            Self::Network(_) => "NETWORK",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Rejected { .. } => "REJECTED",
        }
    }

    /// HTTP status that produced this error, if one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Authorization(_) | Self::AuthenticationFailure(_) => Some(401),
            Self::Server { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::Validation(_) | Self::Network(_) => None,
        }
    }

    /// Classify a non-success status from the backend.
    ///
    /// `public` marks calls made without a bearer token (login, refresh, register),
    /// where a 401 means the submitted credentials were wrong.
    pub fn from_status(status: u16, message: Option<&str>, public: bool) -> Self {
        let message = sanitize_message(message);
        match status {
            401 if public => Self::AuthenticationFailure(message),
            401 => Self::Authorization(message),
            400..=499 => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// A 2xx response whose body could not be decoded into the expected record.
    pub fn malformed(status: u16, detail: impl std::fmt::Display) -> Self {
        Self::Server { status, message: format!("malformed response: {detail}") }
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timed out".to_owned())
        } else if err.is_connect() {
            Self::Network(format!("unable to reach the server: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Trim and truncate a backend message for display.
pub fn sanitize_message(message: Option<&str>) -> String {
    let trimmed = message.unwrap_or_default().trim();
    if trimmed.is_empty() {
        "request failed".to_owned()
    } else {
        trimmed.chars().take(MAX_MESSAGE_CHARS).collect()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
