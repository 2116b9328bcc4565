use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};

/// Marketplace role. Decides which path prefixes a user may visit and
/// where they land after signing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Lists produce and books rental equipment
    Farmer,
    /// Owns rental equipment and approves bookings
    Owner,
    /// Browses produce
    Buyer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Farmer, Role::Owner, Role::Buyer];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Owner => "owner",
            Self::Buyer => "buyer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "farmer" => Ok(Self::Farmer),
            "owner" => Ok(Self::Owner),
            "buyer" => Ok(Self::Buyer),
            other => Err(MarketError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// The application-level record stored at `users/<uid>`.
///
/// Written once by the sign-up flow. The session controller only reads it,
/// and only ever inspects `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: String,
    pub name: String,
    pub role: Role,
    pub phone_number: String,
    pub district: String,
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Profile {
    /// Decode a profile from a raw document body.
    pub fn from_document(data: serde_json::Value) -> MarketResult<Self> {
        serde_json::from_value(data)
            .map_err(|e| MarketError::Serialization(format!("profile document: {e}")))
    }

    /// Encode the profile as a document body.
    pub fn to_document(&self) -> MarketResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
