//! Shared application state for the session core.
//!
//! `SharedAppState` bundles everything that lives for the whole process: the
//! error bridge, its single permission-error listener and the session
//! controller. Hosts build one at start-up and hand clones to whatever needs
//! to read the session or run the sign-in/sign-up flows.

use std::sync::Arc;

use crate::bridge::{ErrorBridge, PermissionErrorListener};
use crate::config::MarketConfig;
use crate::session::SessionController;
use crate::traits::{Navigator, Notifier, ProfileStore, SessionStore};

#[derive(Clone)]
pub struct SharedAppState {
    pub config: MarketConfig,
    pub session_store: Arc<dyn SessionStore>,
    pub profile_store: Arc<dyn ProfileStore>,
    pub notifier: Arc<dyn Notifier>,
    pub bridge: Arc<ErrorBridge>,
    pub controller: Arc<SessionController>,
    _listener: Arc<PermissionErrorListener>,
}

impl SharedAppState {
    /// Wire the bridge, the listener and the controller together.
    ///
    /// The listener is attached before the controller exists so that no
    /// permission failure can be published into an empty bridge.
    pub fn new(
        config: MarketConfig,
        session_store: Arc<dyn SessionStore>,
        profile_store: Arc<dyn ProfileStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let bridge = ErrorBridge::shared();
        let listener = Arc::new(PermissionErrorListener::attach(&bridge, notifier.clone()));
        let controller = SessionController::new(
            session_store.clone(),
            profile_store.clone(),
            navigator,
            notifier.clone(),
            bridge.clone(),
            config.clone(),
        );
        Self {
            config,
            session_store,
            profile_store,
            notifier,
            bridge,
            controller,
            _listener: listener,
        }
    }

    /// Mount the controller at `initial_path`.
    pub fn start(&self, initial_path: &str) {
        self.controller.start(initial_path);
    }
}
