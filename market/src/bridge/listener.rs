//! The single bridge subscriber that turns permission failures into toasts.

use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use super::{ErrorBridge, Topic};
use crate::config::PERMISSION_ERROR_TITLE;
use crate::subscription::Subscription;
use crate::traits::{Notification, Notifier};

/// Permission errors stay on screen long enough to be read and copied.
const PERMISSION_ERROR_DISPLAY: Duration = Duration::from_secs(100);

/// Listens on [`Topic::PermissionError`] for as long as it is alive.
///
/// Mount one per process, above the session controller, and keep it for the
/// whole application lifetime; the bridge does not buffer.
pub struct PermissionErrorListener {
    _subscription: Subscription,
}

impl PermissionErrorListener {
    pub fn attach(bridge: &ErrorBridge, notifier: Arc<dyn Notifier>) -> Self {
        let subscription = bridge.subscribe(Topic::PermissionError, move |failure| {
            error!("{}", failure);
            notifier.notify(
                Notification::destructive(PERMISSION_ERROR_TITLE, failure.to_string())
                    .with_duration(PERMISSION_ERROR_DISPLAY),
            );
        });
        Self {
            _subscription: subscription,
        }
    }
}
