//! Mock document database for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{MarketError, MarketResult};
use crate::subscription::Subscription;
use crate::traits::{
    document_path, DocumentSnapshot, ProfileStore, SnapshotCallback, StoreError,
    StoreErrorCallback,
};

type SharedSnapshotCallback = Arc<dyn Fn(DocumentSnapshot) + Send + Sync>;
type SharedErrorCallback = Arc<dyn Fn(StoreError) + Send + Sync>;

struct Observer {
    id: u64,
    on_value: SharedSnapshotCallback,
    on_error: SharedErrorCallback,
}

#[derive(Default)]
struct MockProfileInner {
    /// Document bodies keyed by full path.
    documents: HashMap<String, serde_json::Value>,
    observers: HashMap<String, Vec<Observer>>,
    /// Total `observe_document` calls per path, including released ones.
    subscribe_counts: HashMap<String, usize>,
    deliver_on_subscribe: bool,
    fail_writes: bool,
}

/// Mock document store with per-document observers.
///
/// By default nothing is delivered until the test calls one of the `emit_*`
/// methods, which gives full control over interleavings. With
/// [`MockProfileStore::with_initial_delivery`] each new observer receives
/// the current snapshot synchronously, as a local cache would.
#[derive(Clone, Default)]
pub struct MockProfileStore {
    inner: Arc<Mutex<MockProfileInner>>,
    next_id: Arc<AtomicU64>,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_delivery() -> Self {
        let store = Self::new();
        store.inner.lock().deliver_on_subscribe = true;
        store
    }

    /// Store a document body and deliver it to the document's observers.
    pub fn emit_value(&self, collection: &str, id: &str, data: serde_json::Value) {
        let path = document_path(collection, id);
        self.inner.lock().documents.insert(path.clone(), data.clone());
        self.deliver(&path, DocumentSnapshot::found(path.clone(), data));
    }

    /// Remove the document (if any) and deliver a missing snapshot.
    pub fn emit_missing(&self, collection: &str, id: &str) {
        let path = document_path(collection, id);
        self.inner.lock().documents.remove(&path);
        self.deliver(&path, DocumentSnapshot::missing(path.clone()));
    }

    /// Fail every observer of the document. Their streams are dead afterwards.
    pub fn emit_error(&self, collection: &str, id: &str, error: StoreError) {
        let path = document_path(collection, id);
        let callbacks: Vec<SharedErrorCallback> = self
            .inner
            .lock()
            .observers
            .remove(&path)
            .unwrap_or_default()
            .into_iter()
            .map(|o| o.on_error)
            .collect();
        for callback in callbacks {
            callback(error.clone());
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<serde_json::Value> {
        self.inner
            .lock()
            .documents
            .get(&document_path(collection, id))
            .cloned()
    }

    /// Observers currently registered on the document.
    pub fn active_observers(&self, collection: &str, id: &str) -> usize {
        self.inner
            .lock()
            .observers
            .get(&document_path(collection, id))
            .map_or(0, Vec::len)
    }

    /// Observers currently registered across all documents.
    pub fn total_active_observers(&self) -> usize {
        self.inner.lock().observers.values().map(Vec::len).sum()
    }

    /// How many times the document has been subscribed to.
    pub fn subscribe_count(&self, collection: &str, id: &str) -> usize {
        self.inner
            .lock()
            .subscribe_counts
            .get(&document_path(collection, id))
            .copied()
            .unwrap_or(0)
    }

    fn deliver(&self, path: &str, snapshot: DocumentSnapshot) {
        let callbacks: Vec<SharedSnapshotCallback> = self
            .inner
            .lock()
            .observers
            .get(path)
            .map(|list| list.iter().map(|o| o.on_value.clone()).collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    fn observe_document(
        &self,
        collection: &str,
        id: &str,
        on_value: SnapshotCallback,
        on_error: StoreErrorCallback,
    ) -> Subscription {
        let path = document_path(collection, id);
        let observer_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let on_value: SharedSnapshotCallback = Arc::from(on_value);

        let initial = {
            let mut inner = self.inner.lock();
            *inner.subscribe_counts.entry(path.clone()).or_insert(0) += 1;
            inner.observers.entry(path.clone()).or_default().push(Observer {
                id: observer_id,
                on_value: on_value.clone(),
                on_error: Arc::from(on_error),
            });
            inner.deliver_on_subscribe.then(|| {
                match inner.documents.get(&path) {
                    Some(data) => DocumentSnapshot::found(path.clone(), data.clone()),
                    None => DocumentSnapshot::missing(path.clone()),
                }
            })
        };
        if let Some(snapshot) = initial {
            on_value(snapshot);
        }

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                if let Some(list) = inner.lock().observers.get_mut(&path) {
                    list.retain(|o| o.id != observer_id);
                }
            }
        })
    }

    async fn write_document(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> MarketResult<()> {
        if self.inner.lock().fail_writes {
            return Err(MarketError::ProfileStore("simulated write failure".into()));
        }
        self.emit_value(collection, id, data);
        Ok(())
    }
}
