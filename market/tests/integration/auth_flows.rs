//! Sign-in and sign-up flows driving the controller through the backends.

use agrimarket::actions::{sign_in, sign_up, SignupForm};
use agrimarket::mocks::MockProfileStore;
use agrimarket::{Identity, MarketError, Role};

use crate::common::SessionHarness;

fn form(email: &str, role: &str) -> SignupForm {
    SignupForm {
        name: "Meena".into(),
        email: email.into(),
        phone_number: "9988776655".into(),
        password: "secret1".into(),
        district: "Mandya".into(),
        state: "Karnataka".into(),
        role: role.into(),
    }
}

#[tokio::test]
async fn test_sign_up_lands_on_role_page() {
    let h = SessionHarness::with_profiles(MockProfileStore::with_initial_delivery());
    h.app.start("/signup");

    let profile = sign_up(&h.app, &form("meena@test.com", "owner")).await.unwrap();

    assert_eq!(profile.role, Role::Owner);
    assert_eq!(profile.email.as_deref(), Some("meena@test.com"));
    let stored = h.profiles.document("users", &profile.uid).unwrap();
    assert_eq!(stored["phoneNumber"], "9988776655");

    // Account creation resolves the profile as missing first, then the
    // write delivers it.
    assert_eq!(h.redirects(), vec!["/owner/dashboard"]);
    assert_eq!(h.controller().current_profile().unwrap(), profile);
}

#[tokio::test]
async fn test_sign_up_validation_touches_no_backend() {
    let h = SessionHarness::started("/signup");
    let mut bad = form("not-an-email", "farmer");
    bad.password = "123".into();

    let err = sign_up(&h.app, &bad).await.unwrap_err();

    assert!(matches!(err, MarketError::Validation(_)));
    assert!(h.session.current().is_none());
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn test_sign_up_duplicate_email_notifies() {
    let h = SessionHarness::started("/signup");
    sign_up(&h.app, &form("dup@test.com", "buyer")).await.unwrap();

    let err = sign_up(&h.app, &form("dup@test.com", "buyer")).await.unwrap_err();

    assert!(matches!(err, MarketError::Session(_)));
    assert_eq!(h.notifier.titles(), vec!["Sign Up Failed"]);
}

#[tokio::test]
async fn test_sign_up_profile_write_failure_leaves_user_unprofiled() {
    let h = SessionHarness::with_profiles(MockProfileStore::with_initial_delivery());
    h.app.start("/signup");
    h.profiles.set_fail_writes(true);

    let err = sign_up(&h.app, &form("nowrite@test.com", "farmer")).await.unwrap_err();

    assert!(matches!(err, MarketError::ProfileStore(_)));
    assert_eq!(h.notifier.titles(), vec!["Sign Up Failed"]);
    assert!(h.controller().current_user().is_some());
    assert!(h.controller().current_profile().is_none());
    assert!(h.redirects().is_empty());
}

#[tokio::test]
async fn test_sign_in_redirects_from_login() {
    let h = SessionHarness::started("/login");
    h.session
        .add_account("farmer@test.com", "secret1", Identity::new("f1"));
    h.sign_out_externally();

    sign_in(&h.app, "farmer@test.com", "secret1").await.unwrap();
    assert!(h.controller().is_loading());
    h.deliver_profile("f1", Role::Farmer);

    assert_eq!(h.redirects(), vec!["/farmer/dashboard"]);
}

#[tokio::test]
async fn test_sign_in_failure_notifies() {
    let h = SessionHarness::started("/login");
    h.sign_out_externally();

    let err = sign_in(&h.app, "ghost@test.com", "whatever").await.unwrap_err();

    assert!(matches!(err, MarketError::Session(_)));
    assert_eq!(h.notifier.titles(), vec!["Login Failed"]);
    assert!(h.redirects().is_empty());
}

#[tokio::test]
async fn test_sign_in_rejects_malformed_input() {
    let h = SessionHarness::started("/login");
    assert!(matches!(
        sign_in(&h.app, "nope", "x").await,
        Err(MarketError::Validation(_))
    ));
    assert!(matches!(
        sign_in(&h.app, "a@test.com", "").await,
        Err(MarketError::Validation(_))
    ));
}
