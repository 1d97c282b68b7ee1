//! Client-side auth state shared by every mounted route guard.
//!
//! Lifecycle: `Uninitialized → Initializing → Ready(user | none)`. After the
//! first `Ready`, sign-in/sign-out/expiry move between `Ready` values. Every
//! transition is broadcast to all subscribers.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use motorhub_auth::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Uninitialized,
    Initializing,
    Ready(Option<AuthenticatedUser>),
}

impl AuthState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, AuthState::Ready(_))
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            AuthState::Ready(user) => user.as_ref(),
            _ => None,
        }
    }
}

/// Explicit auth-state store, passed to guards by reference (or `Arc`).
#[derive(Debug)]
pub struct AuthStateStore {
    tx: watch::Sender<AuthState>,
}

impl Default for AuthStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::Uninitialized);
        Self { tx }
    }

    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// Mark that the identity provider has been asked for its initial state.
    ///
    /// Only moves out of `Uninitialized`; later calls are no-ops.
    pub fn begin_initialization(&self) {
        self.tx.send_if_modified(|state| {
            if *state == AuthState::Uninitialized {
                *state = AuthState::Initializing;
                true
            } else {
                false
            }
        });
    }

    /// The identity provider reported a user (or none).
    pub fn set_ready(&self, user: Option<AuthenticatedUser>) {
        self.tx.send_replace(AuthState::Ready(user));
    }

    /// The identity provider could not produce an initial state.
    ///
    /// Fails closed: the client proceeds as signed out.
    pub fn fail_initialization(&self, reason: &str) {
        warn!(reason, "auth initialization failed; treating client as unauthenticated");
        self.tx.send_replace(AuthState::Ready(None));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(AuthState::Ready(None));
    }

    /// Session expired and the provider's refresh attempt failed.
    pub fn session_expired(&self) {
        info!("session expired; signing out");
        self.tx.send_replace(AuthState::Ready(None));
    }

    pub fn subscribe(&self) -> AuthStateSubscription {
        AuthStateSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Wait until the state is `Ready`, bounded by `timeout`.
    ///
    /// Returns `None` when the wait times out: the caller must treat that
    /// as unauthenticated.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Option<AuthenticatedUser> {
        let mut rx = self.tx.subscribe();

        let waited = tokio::time::timeout(timeout, rx.wait_for(AuthState::is_resolved)).await;
        match waited {
            Ok(Ok(state)) => state.user().cloned(),
            Ok(Err(_)) => {
                warn!("auth state store closed before initialization finished");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "auth initialization timed out; treating client as unauthenticated"
                );
                None
            }
        }
    }
}

/// A live view of the store. Dropping it unsubscribes.
#[derive(Debug, Clone)]
pub struct AuthStateSubscription {
    rx: watch::Receiver<AuthState>,
}

impl AuthStateSubscription {
    pub fn current(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    /// Wait for the next transition. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use motorhub_auth::{Identity, Role};
    use motorhub_core::IdentityId;

    use super::*;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser::new(
            Identity::new(IdentityId::parse("uid-3").unwrap(), "c@example.com", "C"),
            role,
        )
    }

    #[test]
    fn begin_initialization_only_from_uninitialized() {
        let store = AuthStateStore::new();
        store.begin_initialization();
        assert_eq!(store.current(), AuthState::Initializing);

        store.set_ready(None);
        store.begin_initialization();
        assert_eq!(store.current(), AuthState::Ready(None));
    }

    #[test]
    fn failed_initialization_fails_closed() {
        let store = AuthStateStore::new();
        store.begin_initialization();
        store.fail_initialization("provider unreachable");
        assert_eq!(store.current(), AuthState::Ready(None));
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let store = AuthStateStore::new();
        let sub = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn transitions_are_broadcast() {
        let store = AuthStateStore::new();
        let mut a = store.subscribe();
        let mut b = store.subscribe();

        store.set_ready(Some(user(Role::Vendor)));
        assert_eq!(a.changed().await.unwrap().user().unwrap().role, Role::Vendor);
        assert_eq!(b.changed().await.unwrap().user().unwrap().role, Role::Vendor);

        store.sign_out();
        assert_eq!(a.changed().await, Some(AuthState::Ready(None)));
    }

    #[tokio::test]
    async fn session_expiry_is_broadcast_as_signed_out() {
        let store = AuthStateStore::new();
        let mut a = store.subscribe();
        let mut b = store.subscribe();

        store.begin_initialization();
        store.set_ready(Some(user(Role::Customer)));
        assert_eq!(a.changed().await, Some(AuthState::Ready(Some(user(Role::Customer)))));
        assert_eq!(b.changed().await, Some(AuthState::Ready(Some(user(Role::Customer)))));

        store.session_expired();
        assert_eq!(a.changed().await, Some(AuthState::Ready(None)));
        assert_eq!(b.changed().await, Some(AuthState::Ready(None)));
        assert_eq!(store.current(), AuthState::Ready(None));

        // Already resolved: no waiting, and no user.
        assert_eq!(store.wait_until_ready(Duration::from_millis(1)).await, None);
    }

    #[tokio::test]
    async fn changed_returns_none_after_store_drop() {
        let store = AuthStateStore::new();
        let mut sub = store.subscribe();
        drop(store);
        assert_eq!(sub.changed().await, None);
    }

    #[tokio::test]
    async fn wait_until_ready_returns_user() {
        let store = std::sync::Arc::new(AuthStateStore::new());
        store.begin_initialization();

        let writer = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            writer.set_ready(Some(user(Role::Admin)));
        });

        let resolved = store.wait_until_ready(Duration::from_secs(2)).await;
        assert_eq!(resolved.map(|u| u.role), Some(Role::Admin));
    }

    #[tokio::test]
    async fn wait_until_ready_times_out_closed() {
        let store = AuthStateStore::new();
        store.begin_initialization();
        assert_eq!(store.wait_until_ready(Duration::from_millis(20)).await, None);
    }
}
