//! Identity changes: subscription teardown and stale deliveries.

use std::sync::Arc;

use agrimarket::config::MarketConfig;
use agrimarket::mocks::{MockProfileStore, MockSessionStore, RecordingNavigator, RecordingNotifier};
use agrimarket::{
    DocumentSnapshot, ErrorBridge, Identity, MarketResult, ProfileStore, Role, SessionController,
    StoreError, Subscription,
};
use agrimarket::traits::{SnapshotCallback, StoreErrorCallback};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::common::{profile_doc, SessionHarness};

#[test]
fn test_switch_drops_previous_profile_immediately() {
    let h = SessionHarness::started("/");
    h.authenticate("A", Role::Farmer);
    assert_eq!(h.controller().current_profile().unwrap().uid, "A");

    h.sign_in_as("B");

    assert!(h.controller().current_profile().is_none());
    assert!(h.controller().is_loading());
    assert_eq!(h.profiles.active_observers("users", "A"), 0);
    assert_eq!(h.profiles.active_observers("users", "B"), 1);
}

#[test]
fn test_late_snapshot_for_previous_identity_is_ignored() {
    let h = SessionHarness::started("/");
    h.sign_in_as("A");
    h.sign_in_as("B");

    // A's document arrives after the switch; nobody is listening any more.
    h.deliver_profile("A", Role::Farmer);
    assert!(h.controller().current_profile().is_none());

    h.deliver_profile("B", Role::Owner);
    let profile = h.controller().current_profile().unwrap();
    assert_eq!(profile.uid, "B");
    assert_eq!(profile.role, Role::Owner);
}

#[test]
fn test_sign_out_releases_profile_subscription() {
    let h = SessionHarness::started("/");
    h.authenticate("A", Role::Buyer);
    h.sign_out_externally();
    assert_eq!(h.profiles.total_active_observers(), 0);
    assert!(h.controller().current_user().is_none());
}

#[test]
fn test_cached_profile_resolves_synchronously() {
    let profiles = MockProfileStore::with_initial_delivery();
    profiles.emit_value("users", "A", profile_doc("A", Role::Owner));
    let h = SessionHarness::with_profiles(profiles);
    h.app.start("/login");

    h.sign_in_as("A");

    assert!(!h.controller().is_loading());
    assert_eq!(h.redirects(), vec!["/owner/dashboard"]);
}

/// A backend whose callbacks survive unsubscription, to prove the
/// controller itself discards deliveries meant for an earlier identity.
#[derive(Clone, Default)]
struct LeakyProfileStore {
    callbacks: Arc<Mutex<Vec<(String, Arc<SnapshotCallback>, Arc<StoreErrorCallback>)>>>,
}

impl LeakyProfileStore {
    fn fire_value(&self, id: &str, data: serde_json::Value) {
        let callbacks: Vec<_> = self
            .callbacks
            .lock()
            .iter()
            .filter(|(cid, _, _)| cid == id)
            .map(|(_, v, _)| v.clone())
            .collect();
        for callback in callbacks {
            callback(DocumentSnapshot::found(format!("users/{id}"), data.clone()));
        }
    }

    fn fire_error(&self, id: &str) {
        let callbacks: Vec<_> = self
            .callbacks
            .lock()
            .iter()
            .filter(|(cid, _, _)| cid == id)
            .map(|(_, _, e)| e.clone())
            .collect();
        for callback in callbacks {
            callback(StoreError::permission_denied("late"));
        }
    }
}

#[async_trait]
impl ProfileStore for LeakyProfileStore {
    fn observe_document(
        &self,
        _collection: &str,
        id: &str,
        on_value: SnapshotCallback,
        on_error: StoreErrorCallback,
    ) -> Subscription {
        self.callbacks
            .lock()
            .push((id.to_string(), Arc::new(on_value), Arc::new(on_error)));
        Subscription::noop()
    }

    async fn write_document(
        &self,
        _collection: &str,
        _id: &str,
        _data: serde_json::Value,
    ) -> MarketResult<()> {
        Ok(())
    }
}

#[test]
fn test_controller_discards_deliveries_from_released_subscription() {
    let session = MockSessionStore::new();
    let profiles = LeakyProfileStore::default();
    let bridge = ErrorBridge::shared();
    let published = Arc::new(Mutex::new(0usize));
    let p = published.clone();
    let _tap = bridge.subscribe(agrimarket::Topic::PermissionError, move |_| *p.lock() += 1);

    let controller = SessionController::new(
        Arc::new(session.clone()),
        Arc::new(profiles.clone()),
        Arc::new(RecordingNavigator::new()),
        Arc::new(RecordingNotifier::new()),
        bridge,
        MarketConfig::default(),
    );
    controller.start("/");

    session.emit(Some(Identity::new("A")));
    session.emit(Some(Identity::new("B")));

    profiles.fire_value("A", profile_doc("A", Role::Farmer));
    profiles.fire_error("A");

    assert!(controller.current_profile().is_none());
    assert!(controller.is_loading(), "B's profile has not resolved");
    assert_eq!(*published.lock(), 0);

    profiles.fire_value("B", profile_doc("B", Role::Buyer));
    assert_eq!(controller.current_profile().unwrap().uid, "B");
}

#[test]
fn test_dropping_controller_releases_streams() {
    let h = SessionHarness::started("/");
    h.sign_in_as("A");
    let SessionHarness {
        app,
        session,
        profiles,
        ..
    } = h;
    drop(app);
    assert_eq!(session.observer_count(), 0);
    assert_eq!(profiles.total_active_observers(), 0);
}
