//! Permission failures travelling from the controller to the notifier.

use std::sync::Arc;

use agrimarket::{OperationKind, Role, SessionState, StoreError, Topic};
use parking_lot::Mutex;

use crate::common::SessionHarness;

#[test]
fn test_denied_profile_read_reaches_notifier() {
    let h = SessionHarness::started("/farmer/dashboard");
    h.sign_in_as("U3");
    h.deny_profile("U3");

    let notes = h.notifier.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Permission Error");
    assert!(notes[0].description.contains("users/U3"));

    // No profile: parked on the sign-in page, still signed in.
    assert_eq!(h.redirects(), vec!["/login"]);
    assert!(matches!(
        h.controller().state(),
        SessionState::ProfileUnavailable { .. }
    ));
}

#[test]
fn test_event_payload_shape() {
    let h = SessionHarness::started("/");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let _tap = h
        .app
        .bridge
        .subscribe(Topic::PermissionError, move |f| s.lock().push(f.clone()));

    h.sign_in_as("U5");
    h.deny_profile("U5");

    let seen = seen.lock();
    assert_eq!(seen[0].resource_path, "users/U5");
    assert_eq!(seen[0].operation_kind, OperationKind::Get);
    assert!(seen[0].cause_message.contains("insufficient permissions"));
}

#[test]
fn test_denied_then_new_identity_recovers() {
    let h = SessionHarness::started("/");
    h.sign_in_as("U3");
    h.deny_profile("U3");
    h.authenticate("U4", Role::Buyer);

    assert_eq!(h.controller().current_profile().unwrap().uid, "U4");
    assert_eq!(h.notifier.count(), 1);
}

#[test]
fn test_each_failure_is_reported_separately() {
    let h = SessionHarness::started("/");
    h.sign_in_as("X");
    h.deny_profile("X");
    h.sign_out_externally();
    h.sign_in_as("X");
    h.deny_profile("X");
    assert_eq!(h.notifier.count(), 2);
}

#[test]
fn test_denial_after_profile_keeps_farmer_on_dashboard() {
    let h = SessionHarness::started("/farmer/dashboard");
    h.authenticate("F1", Role::Farmer);
    h.deny_profile("F1");

    assert!(matches!(
        h.controller().state(),
        SessionState::Authenticated { .. }
    ));
    assert_eq!(h.controller().current_profile().unwrap().role, Role::Farmer);
    assert!(h.redirects().is_empty());
    assert_eq!(h.notifier.count(), 1);
    assert_eq!(h.session.sign_out_calls(), 0);
}

#[test]
fn test_unavailable_backend_reaches_notifier() {
    let h = SessionHarness::started("/");
    h.sign_in_as("U5");
    h.profiles
        .emit_error("users", "U5", StoreError::unavailable("backend offline"));

    let notes = h.notifier.notifications();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].description.contains("backend offline"));
    assert!(!h.controller().is_loading());
}

#[test]
fn test_reemitted_identity_recovers_after_denial() {
    let h = SessionHarness::started("/owner/dashboard");
    h.sign_in_as("O1");
    h.deny_profile("O1");
    assert_eq!(h.redirects(), vec!["/login"]);

    h.sign_in_as("O1");
    h.deliver_profile("O1", Role::Owner);

    assert_eq!(h.controller().current_profile().unwrap().uid, "O1");
    assert_eq!(h.redirects(), vec!["/login", "/owner/dashboard"]);
}
