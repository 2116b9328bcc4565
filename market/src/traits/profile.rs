//! Document database abstraction for profile records.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::MarketResult;
use crate::subscription::Subscription;

/// Build the `collection/id` path of a document.
pub fn document_path(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}

/// One delivery from a document stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// Full path of the observed document (`users/<uid>`).
    pub path: String,
    /// Document body, or `None` if the document does not exist (yet).
    pub data: Option<serde_json::Value>,
}

impl DocumentSnapshot {
    pub fn found(path: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            path: path.into(),
            data: Some(data),
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: None,
        }
    }

    pub const fn exists(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreErrorCode {
    PermissionDenied,
    Unavailable,
    Other,
}

/// Subscription-level failure reported by the document database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::PermissionDenied,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::Unavailable,
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

pub type SnapshotCallback = Box<dyn Fn(DocumentSnapshot) + Send + Sync>;
pub type StoreErrorCallback = Box<dyn Fn(StoreError) + Send + Sync>;

/// Abstraction over the external document database.
///
/// This trait enables testing of profile-dependent code without a running
/// backend.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Watch a single document.
    ///
    /// `on_value` receives every snapshot (existing or missing); `on_error`
    /// receives a subscription-level failure, after which the stream is dead.
    fn observe_document(
        &self,
        collection: &str,
        id: &str,
        on_value: SnapshotCallback,
        on_error: StoreErrorCallback,
    ) -> Subscription;

    /// Create or replace a document.
    async fn write_document(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> MarketResult<()>;
}
