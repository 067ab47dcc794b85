//! # SessionStore — the single owner of the authenticated session
//!
//! Holds the in-memory [`Session`], mirrors it into durable storage through a
//! [`SessionVault`], and tells subscribers when it changes. Nothing else in the
//! workspace writes the persisted session; readers go through
//! [`SessionStore::current`] or subscribe with [`SessionStore::on_change`].
//!
//! ## Lifecycle
//!
//! | Call | Effect |
//! |------|--------|
//! | [`open`](SessionStore::open) | Rehydrates from storage. A stored token is trusted until a request using it is rejected. |
//! | [`login`](SessionStore::login) | `POST /members/login`; on success replaces the session, persists it, notifies. On failure nothing changes. |
//! | [`logout`](SessionStore::logout) | Clears memory and storage. Idempotent; notifies only if a session existed. |
//! | [`invalidate`](SessionStore::invalidate) | Logs out only if the current token is the rejected one. |
//!
//! ## Threading
//!
//! The store is `Rc`-shared and lives on one thread. No `RefCell` borrow is
//! held across an `.await`, so any number of requests may be in flight while
//! the session changes underneath them.
//!
//! ## Subscribers
//!
//! Callbacks run synchronously, in registration order, on the task that
//! changed the session. Driving `login` or `logout` to completion from inside a
//! callback is a contract violation and panics.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use store::{Identity, KeyValueStore, Session, SessionVault};

use crate::error::{ApiError, ApiResult};
use crate::models::{Credentials, LoginResponse};
use crate::transport::{HttpRequest, HttpTransport};

/// Handle returned by [`SessionStore::on_change`].
pub type SubscriptionId = u64;

type Subscriber = Rc<dyn Fn(&Session)>;

struct Inner<S: KeyValueStore, T: HttpTransport> {
    vault: SessionVault<S>,
    transport: T,
    state: RefCell<Session>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Cell<SubscriptionId>,
    notifying: Cell<bool>,
}

/// Shared, single-threaded owner of the current [`Session`].
pub struct SessionStore<S: KeyValueStore, T: HttpTransport> {
    inner: Rc<Inner<S, T>>,
}

impl<S: KeyValueStore, T: HttpTransport> Clone for SessionStore<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Resets the notifying flag even if a subscriber panics.
struct NotifyGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<S: KeyValueStore, T: HttpTransport> SessionStore<S, T> {
    /// Open the store, restoring any persisted session.
    pub async fn open(storage: S, transport: T) -> Self {
        let vault = SessionVault::new(storage);
        let session = vault.load().await;
        if let Some(identity) = session.identity() {
            tracing::info!("Restored session for member {}", identity.id);
        }

        Self {
            inner: Rc::new(Inner {
                vault,
                transport,
                state: RefCell::new(session),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                notifying: Cell::new(false),
            }),
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token().map(str::to_string)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Authenticate with the remote login endpoint.
    ///
    /// # Panics
    ///
    /// If polled from inside an `on_change` subscriber.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        self.assert_not_notifying("login");
        credentials.validate().map_err(ApiError::validation)?;

        let request = HttpRequest::post("/members/login").json(credentials)?;
        let response = self.inner.transport.send(request).await?;
        if !response.is_success() {
            let err = ApiError::from_response(response.status, &response.body);
            tracing::warn!("Login failed for {}: {}", credentials.email, err);
            return Err(err);
        }

        let body: LoginResponse = serde_json::from_slice(&response.body).map_err(|e| {
            ApiError::unexpected(response.status, format!("Unreadable login response: {e}"))
        })?;
        if body.token.is_empty() {
            return Err(ApiError::unexpected(
                response.status,
                "Login response carried no token",
            ));
        }

        let session = Session::authenticated(body.token.clone(), body.identity());
        self.inner.state.replace(session.clone());
        self.persist().await;
        tracing::info!("Signed in as member {}", body.id);
        self.notify();

        Ok(session)
    }

    /// Sign out. Safe to call when already signed out.
    ///
    /// # Panics
    ///
    /// If polled from inside an `on_change` subscriber.
    pub async fn logout(&self) {
        self.assert_not_notifying("logout");

        let previous = self.inner.state.replace(Session::Anonymous);
        self.persist().await;

        if let Some(identity) = previous.identity() {
            tracing::info!("Signed out member {}", identity.id);
            self.notify();
        }
    }

    /// Sign out because the server rejected `rejected_token`.
    ///
    /// Returns `false` when the session already moved on (signed out, or
    /// signed in again with a different token).
    pub async fn invalidate(&self, rejected_token: &str) -> bool {
        let is_current = self.inner.state.borrow().token() == Some(rejected_token);
        if !is_current {
            tracing::debug!("Ignoring rejection of a token that is no longer current");
            return false;
        }

        tracing::warn!("Server rejected the session token, signing out");
        self.logout().await;
        true
    }

    /// Register a callback invoked after every session change.
    pub fn on_change(&self, subscriber: impl Fn(&Session) + 'static) -> SubscriptionId {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Mirror memory into storage. Memory is always written first; if it
    /// changed while the write was pending, write again so storage ends on the
    /// latest state.
    async fn persist(&self) {
        loop {
            let snapshot = self.current();
            self.inner.vault.save(&snapshot).await;
            if *self.inner.state.borrow() == snapshot {
                return;
            }
            tracing::debug!("Session changed during a storage write, writing again");
        }
    }

    fn notify(&self) {
        // Snapshot so callbacks may subscribe or unsubscribe while running.
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, s)| Rc::clone(s))
            .collect();
        let session = self.current();

        self.inner.notifying.set(true);
        let _guard = NotifyGuard(&self.inner.notifying);
        for subscriber in subscribers {
            subscriber(&session);
        }
    }

    fn assert_not_notifying(&self, operation: &str) {
        assert!(
            !self.inner.notifying.get(),
            "SessionStore::{operation} called from inside an on_change subscriber"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use store::MemoryStore;

    fn backend() -> FakeBackend {
        let backend = FakeBackend::new();
        backend.add_member("a@b.com", "secret1", "Alice");
        backend
    }

    #[tokio::test]
    async fn test_login_persists_across_reload() {
        let storage = MemoryStore::new();
        let backend = backend();
        let store = SessionStore::open(storage.clone(), backend.clone()).await;

        let session = store
            .login(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(store.identity().map(|i| i.name), Some("Alice".to_string()));
        assert_eq!(store.current(), session);

        // Simulated reload: a fresh store over the same storage
        drop(store);
        let reloaded = SessionStore::open(storage, backend).await;
        assert_eq!(reloaded.current(), session);
        assert!(reloaded.token().is_some());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_prior_state() {
        let backend = backend();
        let store = SessionStore::open(MemoryStore::new(), backend.clone()).await;
        let first = store
            .login(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();

        let err = store
            .login(&Credentials::new("a@b.com", "wrong-password"))
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert_eq!(store.current(), first);

        backend.set_offline(true);
        let err = store
            .login(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.current(), first);
    }

    #[tokio::test]
    async fn test_invalid_credentials_are_not_sent() {
        let backend = backend();
        let store = SessionStore::open(MemoryStore::new(), backend.clone()).await;

        let err = store
            .login(&Credentials::new("nobody", ""))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_storage_and_is_idempotent() {
        let storage = MemoryStore::new();
        let store = SessionStore::open(storage.clone(), backend()).await;
        store
            .login(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();
        assert!(!storage.is_empty());

        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        store.on_change(move |_| counter.set(counter.get() + 1));

        store.logout().await;
        store.logout().await;
        assert_eq!(store.current(), Session::Anonymous);
        assert!(storage.is_empty());
        assert_eq!(changes.get(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_run_in_registration_order() {
        let store = SessionStore::open(MemoryStore::new(), backend()).await;
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        store.on_change(move |s| log.borrow_mut().push(("header", s.is_authenticated())));
        let log = Rc::clone(&seen);
        let guard_id =
            store.on_change(move |s| log.borrow_mut().push(("guard", s.is_authenticated())));

        store
            .login(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();
        assert!(store.unsubscribe(guard_id));
        assert!(!store.unsubscribe(guard_id));
        store.logout().await;

        assert_eq!(
            *seen.borrow(),
            vec![("header", true), ("guard", true), ("header", false)]
        );
    }

    #[tokio::test]
    async fn test_invalidate_ignores_stale_token() {
        let store = SessionStore::open(MemoryStore::new(), backend()).await;
        store
            .login(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();

        assert!(!store.invalidate("some-older-token").await);
        assert!(store.is_authenticated());

        let token = store.token().unwrap();
        assert!(store.invalidate(&token).await);
        assert!(!store.is_authenticated());
        assert!(!store.invalidate(&token).await);
    }

    /// Storage whose every operation yields first, like a real async backend.
    #[derive(Clone, Default)]
    struct YieldingStore(MemoryStore);

    impl KeyValueStore for YieldingStore {
        async fn get(&self, key: &str) -> Option<String> {
            tokio::task::yield_now().await;
            self.0.get(key).await
        }

        async fn set(&self, key: &str, value: &str) {
            tokio::task::yield_now().await;
            self.0.set(key, value).await
        }

        async fn remove(&self, key: &str) {
            tokio::task::yield_now().await;
            self.0.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_interleaved_login_and_logout_keep_storage_in_sync() {
        for delay in 0..8 {
            let storage = YieldingStore::default();
            let store = SessionStore::open(storage.clone(), backend()).await;
            store
                .login(&Credentials::new("a@b.com", "secret1"))
                .await
                .unwrap();

            let credentials = Credentials::new("a@b.com", "secret1");
            let (login, ()) = futures::join!(store.login(&credentials), async {
                for _ in 0..delay {
                    tokio::task::yield_now().await;
                }
                store.logout().await;
            });
            login.unwrap();

            let persisted = SessionVault::new(storage).load().await;
            assert_eq!(persisted, store.current(), "diverged with delay {delay}");
        }
    }

    #[tokio::test]
    #[should_panic(expected = "called from inside an on_change subscriber")]
    async fn test_reentrant_logout_panics() {
        use std::future::Future;

        let store = SessionStore::open(MemoryStore::new(), backend()).await;
        let inner = store.clone();
        store.on_change(move |_| {
            // Polling logout synchronously from the callback
            let fut = inner.logout();
            let mut fut = std::pin::pin!(fut);
            let waker = futures::task::noop_waker();
            let mut cx = std::task::Context::from_waker(&waker);
            let _ = fut.as_mut().poll(&mut cx);
        });

        store
            .login(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();
    }
}
