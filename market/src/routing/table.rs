use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};
use crate::marketplace::Role;
use crate::util::{normalize_path, path_has_prefix};

/// Paths a role may visit and where it lands by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRoutes {
    pub prefixes: Vec<String>,
    pub landing: String,
}

impl RoleRoutes {
    pub fn new(prefix: &str, landing: &str) -> Self {
        Self {
            prefixes: vec![prefix.to_string()],
            landing: landing.to_string(),
        }
    }
}

/// Static route classification.
///
/// A path is either public (exact match) or belongs to a role's prefix set.
/// Anything else is reachable by nobody and bounces to a landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTable {
    pub public_paths: Vec<String>,
    /// Sign-in/sign-up pages. A user with a profile never stays on these.
    pub auth_entry_paths: Vec<String>,
    pub sign_in_path: String,
    pub roles: BTreeMap<Role, RoleRoutes>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(Role::Farmer, RoleRoutes::new("/farmer", "/farmer/dashboard"));
        roles.insert(Role::Owner, RoleRoutes::new("/owner", "/owner/dashboard"));
        roles.insert(Role::Buyer, RoleRoutes::new("/buyer", "/buyer/marketplace"));
        Self {
            public_paths: vec!["/".into(), "/login".into(), "/signup".into()],
            auth_entry_paths: vec!["/login".into(), "/signup".into()],
            sign_in_path: "/login".into(),
            roles,
        }
    }
}

impl RouteTable {
    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.public_paths.iter().any(|p| normalize_path(p) == path)
    }

    pub fn is_auth_entry(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.auth_entry_paths.iter().any(|p| normalize_path(p) == path)
    }

    /// Whether `path` lies under one of `role`'s allowed prefixes.
    pub fn is_authorized(&self, role: Role, path: &str) -> bool {
        let path = normalize_path(path);
        self.roles
            .get(&role)
            .is_some_and(|r| r.prefixes.iter().any(|p| path_has_prefix(&path, p)))
    }

    pub fn landing_path(&self, role: Role) -> Option<&str> {
        self.roles.get(&role).map(|r| r.landing.as_str())
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    pub fn set_landing(&mut self, role: Role, landing: &str) {
        if let Some(routes) = self.roles.get_mut(&role) {
            routes.landing = landing.to_string();
        }
    }

    /// Reject tables whose redirects could fail to settle.
    pub fn validate(&self) -> MarketResult<()> {
        if !self.is_public(&self.sign_in_path) {
            return Err(MarketError::Config(format!(
                "sign-in path {} must be public",
                self.sign_in_path
            )));
        }
        if let Some(entry) = self.auth_entry_paths.iter().find(|p| !self.is_public(p)) {
            return Err(MarketError::Config(format!(
                "auth entry path {entry} must be public"
            )));
        }
        for role in Role::ALL {
            let routes = self
                .roles
                .get(&role)
                .ok_or_else(|| MarketError::Config(format!("no routes configured for {role}")))?;
            if routes.prefixes.is_empty() {
                return Err(MarketError::Config(format!("{role} has no allowed prefixes")));
            }
            if !self.is_authorized(role, &routes.landing) {
                return Err(MarketError::Config(format!(
                    "{role} landing path {} is outside its own prefixes",
                    routes.landing
                )));
            }
            if self.is_auth_entry(&routes.landing) {
                return Err(MarketError::Config(format!(
                    "{role} landing path {} is an auth entry page",
                    routes.landing
                )));
            }
        }
        Ok(())
    }
}
