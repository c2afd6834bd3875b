//! Route authorization guard.

use serde::Serialize;

use crate::Session;

/// Outcome of checking a protected route against the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Allow,
    /// Not signed in. `from` is the location originally requested so the login
    /// flow may return there afterwards.
    RedirectToLogin { from: String },
    /// Signed in, but the route is admin-only and the role is not admin.
    RedirectToDashboard,
}

impl RouteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether a protected route may render.
///
/// - No IO
/// - No mutation
/// - Same inputs, same answer
pub fn authorize_route(session: &Session, requested: &str, admin_only: bool) -> RouteDecision {
    match session {
        Session::Anonymous => RouteDecision::RedirectToLogin {
            from: requested.to_string(),
        },
        Session::Authenticated { role } if admin_only && !role.is_admin() => {
            tracing::debug!(%role, requested, "admin-only route refused");
            RouteDecision::RedirectToDashboard
        }
        Session::Authenticated { .. } => RouteDecision::Allow,
    }
}
