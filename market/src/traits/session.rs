//! Session service abstraction.

use async_trait::async_trait;

use crate::error::MarketResult;
use crate::marketplace::Identity;
use crate::subscription::Subscription;

/// Invoked with `Some(identity)` when a principal is signed in and `None`
/// when nobody is.
pub type IdentityCallback = Box<dyn Fn(Option<Identity>) + Send + Sync>;

/// Abstraction over the external authentication provider.
///
/// The store owns the session. Consumers learn about it only through the
/// identity stream; `sign_out` succeeding does not itself change anything a
/// consumer can see until the stream emits `None`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Register for identity changes.
    ///
    /// Implementations deliver the current identity (or `None`) as the first
    /// emission, then one emission per change, until the returned
    /// subscription is released.
    fn observe_identity(&self, on_change: IdentityCallback) -> Subscription;

    /// Authenticate with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> MarketResult<Identity>;

    /// Create a new principal and sign it in.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> MarketResult<Identity>;

    /// End the current session.
    async fn sign_out(&self) -> MarketResult<()>;
}
