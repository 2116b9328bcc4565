//! Configuration constants and the loadable route configuration.
//!
//! Constants cover the backend layout and user-facing texts. The route
//! table can be overridden with a JSON file; see [`MarketConfig::load`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MarketError, MarketResult};
use crate::routing::RouteTable;

/// Document collection holding one profile per identity, keyed by uid.
pub const PROFILE_COLLECTION: &str = "users";

/// Bridge topic for backend permission failures.
pub const PERMISSION_ERROR_TOPIC: &str = "permission-error";

pub const PERMISSION_ERROR_TITLE: &str = "Permission Error";

pub const SIGN_OUT_FAILED_TITLE: &str = "Logout Failed";
pub const SIGN_OUT_FAILED_DESCRIPTION: &str =
    "An error occurred while signing out. Please try again.";

pub const SIGN_IN_FAILED_TITLE: &str = "Login Failed";
pub const SIGN_UP_FAILED_TITLE: &str = "Sign Up Failed";

/// Environment variable pointing at a JSON config file.
pub const CONFIG_PATH_ENV: &str = "AGRIMARKET_CONFIG";

/// Sub-directory of the platform config dir searched when the env var is unset.
pub const CONFIG_DIR_NAME: &str = "agrimarket";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Runtime configuration for the session core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketConfig {
    pub profile_collection: String,
    pub routes: RouteTable,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            profile_collection: PROFILE_COLLECTION.to_string(),
            routes: RouteTable::default(),
        }
    }
}

impl MarketConfig {
    /// Resolve configuration: `$AGRIMARKET_CONFIG`, then
    /// `<config dir>/agrimarket/config.json`, then built-in defaults.
    pub fn load() -> MarketResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            info!("Loading config from {} ({})", path, CONFIG_PATH_ENV);
            return Self::from_file(Path::new(&path));
        }
        if let Some(path) = default_config_path().filter(|p| p.exists()) {
            info!("Loading config from {}", path.display());
            return Self::from_file(&path);
        }
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> MarketResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MarketError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> MarketResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| MarketError::Config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MarketResult<()> {
        if self.profile_collection.is_empty() || self.profile_collection.contains('/') {
            return Err(MarketError::Config(format!(
                "profile collection must be a single path segment, got '{}'",
                self.profile_collection
            )));
        }
        self.routes.validate()
    }
}

/// Platform default location of the config file, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
