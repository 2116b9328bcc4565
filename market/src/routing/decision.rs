use serde::Serialize;

use super::table::RouteTable;
use crate::marketplace::Role;
use crate::util::normalize_path;

/// What the session currently allows, as far as routing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Identity or profile not yet resolved. No decision may be taken.
    Loading,
    /// Nobody signed in.
    Anonymous,
    /// Signed in, but no usable profile (not written yet, unreadable or malformed).
    Unprofiled,
    /// Signed in with a profile of this role.
    Role(Role),
}

/// Outcome of evaluating the current path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum RouteDecision {
    /// Render the placeholder, decide later.
    Wait,
    /// Render the requested page.
    Render,
    /// Navigate elsewhere.
    Redirect(String),
}

/// Decide what to do with `path` given `access`.
///
/// A signed-in user without a profile is treated like an anonymous one on
/// protected paths: they are sent to the sign-in page, where they stay until
/// the profile arrives and the auth-entry rule moves them on.
pub fn decide(access: Access, path: &str, table: &RouteTable) -> RouteDecision {
    let target = match access {
        Access::Loading => return RouteDecision::Wait,
        Access::Anonymous | Access::Unprofiled => {
            if table.is_public(path) {
                return RouteDecision::Render;
            }
            table.sign_in_path()
        }
        Access::Role(role) => {
            let landing = table
                .landing_path(role)
                .unwrap_or_else(|| table.sign_in_path());
            if table.is_auth_entry(path) {
                landing
            } else if table.is_public(path) || table.is_authorized(role, path) {
                return RouteDecision::Render;
            } else {
                landing
            }
        }
    };

    if normalize_path(target) == normalize_path(path) {
        RouteDecision::Render
    } else {
        RouteDecision::Redirect(target.to_string())
    }
}
