//! Mock session service for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{MarketError, MarketResult};
use crate::marketplace::Identity;
use crate::subscription::Subscription;
use crate::traits::{IdentityCallback, SessionStore};

type SharedCallback = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

#[derive(Clone)]
struct Account {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct MockSessionInner {
    /// `None` until the provider has resolved whether anyone is signed in.
    current: Option<Option<Identity>>,
    observers: Vec<(u64, SharedCallback)>,
    accounts: HashMap<String, Account>,
    fail_sign_out: bool,
}

/// Mock session service with a controllable identity stream.
///
/// Clones share state. Like a real provider, a new observer receives the
/// current identity immediately once the provider has resolved it; before
/// the first [`MockSessionStore::emit`] observers receive nothing.
#[derive(Clone, Default)]
pub struct MockSessionStore {
    inner: Arc<Mutex<MockSessionInner>>,
    next_id: Arc<AtomicU64>,
    sign_out_calls: Arc<AtomicUsize>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an email/password account that `sign_in` will accept.
    pub fn add_account(&self, email: &str, password: &str, identity: Identity) {
        self.inner.lock().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity,
            },
        );
    }

    /// Push an identity change to every observer.
    pub fn emit(&self, identity: Option<Identity>) {
        let observers: Vec<SharedCallback> = {
            let mut inner = self.inner.lock();
            inner.current = Some(identity.clone());
            inner.observers.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for observer in observers {
            observer(identity.clone());
        }
    }

    pub fn set_fail_sign_out(&self, fail: bool) {
        self.inner.lock().fail_sign_out = fail;
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }

    pub fn current(&self) -> Option<Identity> {
        self.inner.lock().current.clone().flatten()
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    fn observe_identity(&self, on_change: IdentityCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let callback: SharedCallback = Arc::from(on_change);
        let initial = {
            let mut inner = self.inner.lock();
            inner.observers.push((id, callback.clone()));
            inner.current.clone()
        };
        if let Some(identity) = initial {
            callback(identity);
        }

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.lock().observers.retain(|(oid, _)| *oid != id);
            }
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> MarketResult<Identity> {
        let account = self.inner.lock().accounts.get(email).cloned();
        match account {
            Some(account) if account.password == password => {
                self.emit(Some(account.identity.clone()));
                Ok(account.identity)
            }
            _ => Err(MarketError::Session("invalid credentials".into())),
        }
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> MarketResult<Identity> {
        let identity = {
            let mut inner = self.inner.lock();
            if inner.accounts.contains_key(email) {
                return Err(MarketError::Session("email already in use".into()));
            }
            let uid = format!("uid-{}", inner.accounts.len() + 1);
            let identity = Identity::new(uid)
                .with_email(email)
                .with_display_name(display_name);
            inner.accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    identity: identity.clone(),
                },
            );
            identity
        };
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> MarketResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.lock().fail_sign_out {
            return Err(MarketError::Session("simulated sign-out failure".into()));
        }
        self.emit(None);
        Ok(())
    }
}
