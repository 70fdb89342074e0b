// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route gating. Pure and synchronous: reads a session view, never does I/O.

use crate::session::SessionSnapshot;

/// Name of the role that unlocks admin routes.
pub const ADMIN_ROLE: &str = "admin";

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
    Admin,
}

/// Where a gated navigation ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

/// The parts of the session that gating reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    pub authenticated: bool,
    pub roles: Vec<String>,
}

impl SessionView {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

impl From<&SessionSnapshot> for SessionView {
    fn from(snap: &SessionSnapshot) -> Self {
        match snap.session {
            Some(ref session) if snap.state.has_session() => {
                Self { authenticated: true, roles: session.user().role_names() }
            }
            _ => Self::default(),
        }
    }
}

const PUBLIC_ROUTES: &[&str] = &[
    "/login",
    "/register",
    "/forgot-password",
    "/reset-password",
    "/verify-email",
    "/oauth2/consent",
];

/// Access level of an application route. Unknown paths require a session.
pub fn route_access(path: &str) -> RouteAccess {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    if PUBLIC_ROUTES.contains(&path) {
        RouteAccess::Public
    } else if path == "/admin" || path.starts_with("/admin/") {
        RouteAccess::Admin
    } else {
        RouteAccess::Authenticated
    }
}

pub fn gate(access: RouteAccess, view: &SessionView) -> GateDecision {
    match access {
        RouteAccess::Public => GateDecision::Allow,
        _ if !view.authenticated => GateDecision::RedirectToLogin,
        RouteAccess::Admin if !view.is_admin() => GateDecision::RedirectToDashboard,
        _ => GateDecision::Allow,
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
