//! Handle for a live stream registration.
//!
//! Every observer registration in the crate (identity stream, profile
//! document stream, bridge topic) hands back a `Subscription`. Dropping it,
//! or calling [`Subscription::unsubscribe`], releases the registration exactly
//! once, so no callback can fire after its owner has gone away.

use std::fmt;

type Release = Box<dyn FnOnce() + Send>;

#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    release: Option<Release>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Release the registration now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
