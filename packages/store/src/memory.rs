use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::vault::KeyValueStore;

/// In-memory KeyValueStore for testing and headless fallback.
///
/// Clones share the same map, so dropping every consumer and re-opening over a
/// clone behaves like a page reload over the same durable storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panicking writer cannot leave a half-written String behind.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    async fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, Session};
    use crate::vault::{SessionVault, TOKEN_KEY, USER_KEY};

    #[tokio::test]
    async fn test_save_and_load_session() {
        let store = MemoryStore::new();
        let vault = SessionVault::new(store.clone());

        // Initially empty
        assert_eq!(vault.load().await, Session::Anonymous);

        let session = Session::authenticated("jwt-1", Identity::new(3, "Kim", "kim@x.io"));
        vault.save(&session).await;
        assert_eq!(store.len(), 2);

        // A second vault over the same storage sees the session
        let reopened = SessionVault::new(store.clone());
        assert_eq!(reopened.load().await, session);
    }

    #[tokio::test]
    async fn test_identity_is_stored_as_json() {
        let store = MemoryStore::new();
        let vault = SessionVault::new(store.clone());
        vault
            .save(&Session::authenticated("t", Identity::new(1, "A", "a@b.com")))
            .await;

        let raw = store.get(USER_KEY).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "A");
        assert_eq!(value["email"], "a@b.com");
        assert_eq!(store.get(TOKEN_KEY).await.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_clear_and_save_anonymous() {
        let store = MemoryStore::new();
        let vault = SessionVault::new(store.clone());
        vault
            .save(&Session::authenticated("t", Identity::new(1, "A", "a@b.com")))
            .await;

        vault.save(&Session::Anonymous).await;
        assert!(store.is_empty());

        // Clearing twice is harmless
        vault.clear().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_partial_state_is_anonymous() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "orphan").await;
        let vault = SessionVault::new(store.clone());
        assert_eq!(vault.load().await, Session::Anonymous);

        store.set(USER_KEY, "{not json").await;
        assert_eq!(vault.load().await, Session::Anonymous);

        store.remove(TOKEN_KEY).await;
        store
            .set(USER_KEY, r#"{"id":1,"email":"a@b.com","name":"A"}"#)
            .await;
        assert_eq!(vault.load().await, Session::Anonymous);
    }

    #[tokio::test]
    async fn test_identity_without_email_loads() {
        // Older clients persisted only id and name.
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "t").await;
        store.set(USER_KEY, r#"{"id":9,"name":"Old"}"#).await;

        let session = SessionVault::new(store).load().await;
        assert_eq!(session.identity().map(|i| i.display_name()), Some("Old"));
    }
}
