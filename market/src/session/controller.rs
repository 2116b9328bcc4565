//! Session controller: identity stream + profile stream -> state -> routing.
//!
//! Stream callbacks hold only a `Weak` reference to the controller and carry
//! the epoch of the identity they were registered for. Every identity change
//! bumps the epoch and releases the previous profile subscription before a
//! new one is opened, so a late delivery for an old identity is dropped
//! instead of being attributed to the new one.
//!
//! Locks are never held while calling into a store, the navigator, the
//! notifier or the bridge. Stores may deliver synchronously from inside
//! `observe_*`, and a navigator may call straight back into [`SessionController::visit`].

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::state::{ProfileEvent, ProfileGap, SessionState};
use crate::bridge::{BackendFailure, ErrorBridge, OperationKind, Topic};
use crate::config::{MarketConfig, SIGN_OUT_FAILED_DESCRIPTION, SIGN_OUT_FAILED_TITLE};
use crate::error::MarketResult;
use crate::marketplace::{Identity, Profile};
use crate::routing::{decide, RouteDecision};
use crate::subscription::Subscription;
use crate::traits::{
    document_path, DocumentSnapshot, Navigator, Notification, Notifier, ProfileStore,
    SessionStore, StoreError,
};
use crate::util::normalize_path;

/// What the host should draw for the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Render {
    /// Session not resolved: show a spinner, not the page.
    Placeholder,
    Children,
}

/// Read-only snapshot of the session, published to the rest of the app.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: &'static str,
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    pub loading: bool,
    pub path: String,
}

struct Inner {
    state: SessionState,
    path: String,
    /// Bumped on every identity change; tags profile callbacks.
    epoch: u64,
    profile_subscription: Option<Subscription>,
    /// The profile stream of the current epoch reported a failure and is dead.
    profile_failed: bool,
    mounted: bool,
}

pub struct SessionController {
    session_store: Arc<dyn SessionStore>,
    profile_store: Arc<dyn ProfileStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    bridge: Arc<ErrorBridge>,
    config: MarketConfig,
    inner: Mutex<Inner>,
    identity_subscription: Mutex<Option<Subscription>>,
}

impl SessionController {
    pub fn new(
        session_store: Arc<dyn SessionStore>,
        profile_store: Arc<dyn ProfileStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        bridge: Arc<ErrorBridge>,
        config: MarketConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            session_store,
            profile_store,
            navigator,
            notifier,
            bridge,
            config,
            inner: Mutex::new(Inner {
                state: SessionState::Init,
                path: "/".to_string(),
                epoch: 0,
                profile_subscription: None,
                profile_failed: false,
                mounted: false,
            }),
            identity_subscription: Mutex::new(None),
        })
    }

    /// Mount at `initial_path` and subscribe to the identity stream.
    ///
    /// Calling `start` on a mounted controller does nothing.
    pub fn start(self: &Arc<Self>, initial_path: &str) {
        {
            let mut inner = self.inner.lock();
            if inner.mounted {
                return;
            }
            inner.mounted = true;
            inner.path = normalize_path(initial_path);
        }
        info!("Session controller mounted at {}", normalize_path(initial_path));

        let weak: Weak<Self> = Arc::downgrade(self);
        let subscription = self.session_store.observe_identity(Box::new(move |identity| {
            if let Some(controller) = weak.upgrade() {
                controller.handle_identity(identity);
            }
        }));

        if self.inner.lock().mounted {
            *self.identity_subscription.lock() = Some(subscription);
        }
    }

    /// Unmount: release every subscription. No callback reaches the
    /// controller afterwards.
    pub fn shutdown(&self) {
        let profile_subscription = {
            let mut inner = self.inner.lock();
            inner.mounted = false;
            inner.epoch += 1;
            inner.profile_subscription.take()
        };
        let identity_subscription = self.identity_subscription.lock().take();
        drop(profile_subscription);
        drop(identity_subscription);
        info!("Session controller unmounted");
    }

    /// The host navigated to `path` (link click, back button, address bar).
    ///
    /// Returns the decision taken for `path`; a redirect has already been
    /// issued when this returns.
    pub fn visit(&self, path: &str) -> RouteDecision {
        {
            let mut inner = self.inner.lock();
            inner.path = normalize_path(path);
        }
        self.apply_routing()
    }

    /// Re-run the routing effect without any input change.
    pub fn reevaluate(&self) -> RouteDecision {
        self.apply_routing()
    }

    pub fn render(&self) -> Render {
        if self.inner.lock().state.is_loading() {
            Render::Placeholder
        } else {
            Render::Children
        }
    }

    pub fn view(&self) -> SessionView {
        let inner = self.inner.lock();
        SessionView {
            state: inner.state.name(),
            identity: inner.state.identity().cloned(),
            profile: inner.state.profile().cloned(),
            loading: inner.state.is_loading(),
            path: inner.path.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.inner.lock().state.identity().cloned()
    }

    pub fn current_profile(&self) -> Option<Profile> {
        self.inner.lock().state.profile().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().state.is_loading()
    }

    pub fn current_path(&self) -> String {
        self.inner.lock().path.clone()
    }

    /// Ask the session service to end the session.
    ///
    /// State is left alone either way: on success the identity stream emits
    /// `None` and drives the transition; on failure the user is notified and
    /// may retry.
    pub async fn sign_out(&self) -> MarketResult<()> {
        info!("Signing out");
        match self.session_store.sign_out().await {
            Ok(()) => {
                debug!("Sign-out accepted, waiting for identity stream");
                Ok(())
            }
            Err(e) => {
                warn!("Sign-out failed: {}", e);
                self.notifier.notify(Notification::destructive(
                    SIGN_OUT_FAILED_TITLE,
                    SIGN_OUT_FAILED_DESCRIPTION,
                ));
                Err(e)
            }
        }
    }

    fn handle_identity(self: &Arc<Self>, identity: Option<Identity>) {
        let (epoch, stale_subscription) = {
            let mut inner = self.inner.lock();
            if !inner.mounted {
                return;
            }

            let same_principal = matches!(
                (&identity, inner.state.identity()),
                (Some(new), Some(held)) if new.uid == held.uid
            );
            let previous = inner.state.name();
            let state = std::mem::replace(&mut inner.state, SessionState::Init);
            let next = match &identity {
                Some(fresh) if same_principal && !inner.profile_failed => {
                    debug!("Identity {} re-emitted, keeping profile subscription", fresh.uid);
                    inner.state = state.refresh_identity(fresh.clone());
                    return;
                }
                Some(fresh) if same_principal => {
                    debug!(
                        "Identity {} re-emitted after profile failure, resubscribing",
                        fresh.uid
                    );
                    state.refresh_identity(fresh.clone()).retry_profile()
                }
                _ => state.on_identity(identity.clone()),
            };
            inner.state = next;
            inner.epoch += 1;
            inner.profile_failed = false;
            info!(
                "Session {} -> {} (epoch {})",
                previous,
                inner.state.name(),
                inner.epoch
            );
            (inner.epoch, inner.profile_subscription.take())
        };

        if let Some(subscription) = stale_subscription {
            debug!("Releasing profile subscription of epoch {}", epoch - 1);
            drop(subscription);
        }

        if let Some(identity) = identity {
            let subscription = self.subscribe_profile(&identity, epoch);
            let rejected = {
                let mut inner = self.inner.lock();
                if inner.mounted && inner.epoch == epoch {
                    inner.profile_subscription = Some(subscription);
                    None
                } else {
                    Some(subscription)
                }
            };
            // Identity changed again while subscribing.
            drop(rejected);
        }

        self.apply_routing();
    }

    fn subscribe_profile(self: &Arc<Self>, identity: &Identity, epoch: u64) -> Subscription {
        let collection = self.config.profile_collection.clone();
        let path = document_path(&collection, &identity.uid);
        debug!("Subscribing to {} (epoch {})", path, epoch);

        let on_value = {
            let weak = Arc::downgrade(self);
            Box::new(move |snapshot: DocumentSnapshot| {
                if let Some(controller) = weak.upgrade() {
                    controller.handle_snapshot(epoch, snapshot);
                }
            })
        };
        let on_error = {
            let weak = Arc::downgrade(self);
            Box::new(move |error: StoreError| {
                if let Some(controller) = weak.upgrade() {
                    controller.handle_profile_error(epoch, &path, error);
                }
            })
        };

        self.profile_store
            .observe_document(&collection, &identity.uid, on_value, on_error)
    }

    fn handle_snapshot(&self, epoch: u64, snapshot: DocumentSnapshot) {
        {
            let mut inner = self.inner.lock();
            if !inner.mounted || inner.epoch != epoch {
                debug!("Dropping stale snapshot of {} (epoch {})", snapshot.path, epoch);
                return;
            }
            let Some(uid) = inner.state.identity().map(|i| i.uid.clone()) else {
                return;
            };

            let event = match snapshot.data {
                None => {
                    debug!("Profile {} does not exist yet", snapshot.path);
                    ProfileEvent::Absent(ProfileGap::Missing)
                }
                Some(data) => match Profile::from_document(data) {
                    Ok(profile) if profile.uid == uid => ProfileEvent::Found(profile),
                    Ok(profile) => {
                        warn!(
                            "Profile {} carries uid {}, expected {}",
                            snapshot.path, profile.uid, uid
                        );
                        ProfileEvent::Absent(ProfileGap::Malformed)
                    }
                    Err(e) => {
                        warn!("Unusable profile {}: {}", snapshot.path, e);
                        ProfileEvent::Absent(ProfileGap::Malformed)
                    }
                },
            };

            let previous = inner.state.name();
            inner.state =
                std::mem::replace(&mut inner.state, SessionState::Init).on_profile(event);
            info!("Session {} -> {}", previous, inner.state.name());
        }
        self.apply_routing();
    }

    /// Every profile read failure is reported on the bridge. Identity is
    /// untouched and a profile already resolved for it is kept.
    fn handle_profile_error(&self, epoch: u64, path: &str, error: StoreError) {
        {
            let mut inner = self.inner.lock();
            if !inner.mounted || inner.epoch != epoch {
                debug!("Dropping stale profile error for {} (epoch {})", path, epoch);
                return;
            }
            inner.profile_failed = true;
            let previous = inner.state.name();
            inner.state =
                std::mem::replace(&mut inner.state, SessionState::Init).on_profile_failure();
            info!("Session {} -> {} after profile failure", previous, inner.state.name());
        }

        warn!("Profile stream for {} failed: {}", path, error);
        self.bridge.publish(
            Topic::PermissionError,
            BackendFailure::new(path, OperationKind::Get, error.message),
        );
        self.apply_routing();
    }

    /// The routing effect. The only place navigation is issued from.
    fn apply_routing(&self) -> RouteDecision {
        let (decision, from) = {
            let mut inner = self.inner.lock();
            if !inner.mounted {
                return RouteDecision::Wait;
            }
            let decision = decide(inner.state.access(), &inner.path, &self.config.routes);
            let from = inner.path.clone();
            if let RouteDecision::Redirect(target) = &decision {
                inner.path = normalize_path(target);
            }
            (decision, from)
        };

        if let RouteDecision::Redirect(target) = &decision {
            info!("Redirecting {} -> {}", from, target);
            self.navigator.navigate(target);
        }
        decision
    }
}
