//! # Session vault — durable session persistence over a key/value store
//!
//! [`SessionVault`] is the only code that reads or writes the persisted session.
//! All reads and writes go through the [`KeyValueStore`] trait, so the same
//! logic works against an in-memory store (tests), a directory of small files
//! (desktop), or the browser's `localStorage` (web).
//!
//! ## Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | [`TOKEN_KEY`] (`"token"`) | The raw bearer token. |
//! | [`USER_KEY`] (`"user"`) | The [`Identity`] as JSON: `{"id":1,"email":"a@b.com","name":"A"}`. |
//!
//! ## Partial state
//!
//! A token without a readable identity (or the reverse) is treated as no
//! session at all. [`SessionVault::load`] never returns a half-populated
//! [`Session`]; it logs the inconsistency and reports [`Session::Anonymous`].

use crate::models::{Identity, Session};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Async trait for string-keyed durable storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Option<String>>;
    fn set(&self, key: &str, value: &str) -> impl std::future::Future<Output = ()>;
    fn remove(&self, key: &str) -> impl std::future::Future<Output = ()>;
}

/// Persists a [`Session`] into a [`KeyValueStore`].
#[derive(Clone, Debug)]
pub struct SessionVault<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionVault<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the persisted session. Missing or inconsistent data is anonymous.
    pub async fn load(&self) -> Session {
        let token = self.store.get(TOKEN_KEY).await;
        let user = self.store.get(USER_KEY).await;

        match (token, user) {
            (None, None) => Session::Anonymous,
            (Some(token), Some(user)) if !token.is_empty() => {
                match serde_json::from_str::<Identity>(&user) {
                    Ok(identity) => Session::authenticated(token, identity),
                    Err(e) => {
                        tracing::warn!("Discarding persisted session, unreadable identity: {}", e);
                        Session::Anonymous
                    }
                }
            }
            _ => {
                tracing::warn!("Discarding partially persisted session");
                Session::Anonymous
            }
        }
    }

    /// Write the session. Saving [`Session::Anonymous`] clears storage.
    pub async fn save(&self, session: &Session) {
        match session {
            Session::Anonymous => self.clear().await,
            Session::Authenticated { token, identity } => {
                let user = match serde_json::to_string(identity) {
                    Ok(user) => user,
                    Err(e) => {
                        tracing::warn!("Failed to serialise identity: {}", e);
                        return;
                    }
                };
                self.store.set(TOKEN_KEY, token).await;
                self.store.set(USER_KEY, &user).await;
            }
        }
    }

    /// Remove both keys.
    pub async fn clear(&self) {
        self.store.remove(TOKEN_KEY).await;
        self.store.remove(USER_KEY).await;
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
