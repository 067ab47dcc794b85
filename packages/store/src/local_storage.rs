//! # Browser `localStorage` store — web persistence
//!
//! [`LocalStorageStore`] is the [`KeyValueStore`] implementation used on the
//! **web platform**. It writes straight into `window.localStorage`, so the
//! session survives reloads within the same origin.
//!
//! ## Key naming
//!
//! Without a namespace the keys are used verbatim (`"token"`, `"user"`), the
//! names earlier browser builds of the client used. With a namespace every key
//! is prefixed: `"<namespace>:token"`.
//!
//! ## Error handling
//!
//! All trait methods swallow errors (returning `None` for reads, doing nothing
//! for writes). Private browsing modes can refuse storage access; the client
//! then behaves as if nothing was persisted.

use web_sys::Storage;

use crate::vault::KeyValueStore;

/// `localStorage`-backed KeyValueStore for the web platform.
#[derive(Clone, Debug, Default)]
pub struct LocalStorageStore {
    namespace: Option<String>,
}

impl LocalStorageStore {
    /// Create a store using unprefixed keys.
    pub fn new() -> Self {
        Self::with_namespace(None)
    }

    /// Create a store whose keys are prefixed with `namespace`.
    pub fn with_namespace(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
        }
    }

    fn storage(&self) -> Option<Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    fn full_key(&self, key: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{key}"),
            None => key.to_string(),
        }
    }
}

impl KeyValueStore for LocalStorageStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(&self.full_key(key)).ok()?
    }

    async fn set(&self, key: &str, value: &str) {
        let Some(storage) = self.storage() else {
            tracing::warn!("localStorage unavailable, session not persisted");
            return;
        };
        let _ = storage.set_item(&self.full_key(key), value);
    }

    async fn remove(&self, key: &str) {
        if let Some(storage) = self.storage() {
            let _ = storage.remove_item(&self.full_key(key));
        }
    }
}
