//! Error bridge: a process-wide observer registry for backend failures.
//!
//! Constructed once at start-up and handed by reference (`Arc`) to whatever
//! needs to publish or listen. There is no buffering: an event published
//! while a topic has no subscribers is dropped.

pub mod listener;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::subscription::Subscription;

pub use listener::PermissionErrorListener;

/// Event topics carried by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    PermissionError,
}

impl Topic {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PermissionError => crate::config::PERMISSION_ERROR_TOPIC,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of database operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Get,
    List,
    Create,
    Update,
    Delete,
    Write,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Write => "write",
        };
        f.write_str(s)
    }
}

/// Structured payload published on the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendFailure {
    pub resource_path: String,
    pub operation_kind: OperationKind,
    pub cause_message: String,
}

impl BackendFailure {
    pub fn new(
        resource_path: impl Into<String>,
        operation_kind: OperationKind,
        cause_message: impl Into<String>,
    ) -> Self {
        Self {
            resource_path: resource_path.into(),
            operation_kind,
            cause_message: cause_message.into(),
        }
    }
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing or insufficient permissions: {} on {} was denied ({})",
            self.operation_kind, self.resource_path, self.cause_message
        )
    }
}

pub type BridgeHandler = Arc<dyn Fn(&BackendFailure) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<Topic, Vec<(u64, BridgeHandler)>>,
}

#[derive(Default)]
pub struct ErrorBridge {
    registry: Arc<Mutex<Registry>>,
}

impl ErrorBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register `handler` for `topic` until the returned subscription is
    /// released.
    pub fn subscribe(
        &self,
        topic: Topic,
        handler: impl Fn(&BackendFailure) + Send + Sync + 'static,
    ) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            registry.next_id += 1;
            let id = registry.next_id;
            registry
                .handlers
                .entry(topic)
                .or_default()
                .push((id, Arc::new(handler)));
            id
        };
        debug!("Bridge subscriber {} attached to {}", id, topic);

        let weak: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                if let Some(list) = registry.lock().handlers.get_mut(&topic) {
                    list.retain(|(hid, _)| *hid != id);
                }
                debug!("Bridge subscriber {} detached from {}", id, topic);
            }
        })
    }

    /// Deliver `payload` to every current subscriber of `topic`.
    ///
    /// Returns the number of handlers invoked. Handlers run outside the
    /// registry lock, so they may subscribe or unsubscribe freely.
    pub fn publish(&self, topic: Topic, payload: BackendFailure) -> usize {
        let handlers: Vec<BridgeHandler> = self
            .registry
            .lock()
            .handlers
            .get(&topic)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        if handlers.is_empty() {
            debug!("Dropping {} event for {}: no subscribers", topic, payload.resource_path);
            return 0;
        }
        for handler in &handlers {
            handler(&payload);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .lock()
            .handlers
            .get(&topic)
            .map_or(0, Vec::len)
    }
}
