//! Key-value persistence used for timer collections and widget state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::DEFAULT_STORAGE_NAMESPACE;
use crate::error::StoreError;

/// String-blob store keyed by string, e.g. `localStorage` or the host
/// platform's settings.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store. Single-threaded, like everything else here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::KeyValueStore;
    use crate::error::StoreError;

    /// `window.localStorage`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LocalStorage;

    impl LocalStorage {
        fn storage(&self) -> Result<web_sys::Storage, StoreError> {
            gloo_utils::window()
                .local_storage()
                .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?
                .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".to_string()))
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.storage()?
                .get_item(key)
                .map_err(|e| StoreError::ReadFailed(format!("{:?}", e)))
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            // Quota errors surface here
            self.storage()?
                .set_item(key, value)
                .map_err(|e| StoreError::WriteRejected(format!("{:?}", e)))
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.storage()?
                .remove_item(key)
                .map_err(|e| StoreError::WriteRejected(format!("{:?}", e)))
        }
    }
}

/// JSON values stored under `namespace:key`.
///
/// Reads and writes are best-effort: failures are logged, reads then yield
/// `None` and writes are dropped.
pub struct NamespacedStore<S> {
    store: S,
    namespace: String,
}

impl<S: KeyValueStore> NamespacedStore<S> {
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn with_default_namespace(store: S) -> Self {
        Self::new(store, DEFAULT_STORAGE_NAMESPACE)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.full_key(key);
        let raw = match self.store.get(&full_key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(err) => {
                error!("Storage get error for '{}': {}", full_key, err);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                error!("Storage get error for '{}': {}", full_key, err);
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let full_key = self.full_key(key);
        let result = serde_json::to_string(value)
            .map_err(|e| e.to_string())
            .and_then(|raw| self.store.set(&full_key, &raw).map_err(|e| e.to_string()));
        if let Err(err) = result {
            error!("Storage set error for '{}': {}", full_key, err);
        }
    }

    pub fn remove(&self, key: &str) {
        let full_key = self.full_key(key);
        if let Err(err) = self.store.remove(&full_key) {
            error!("Storage remove error for '{}': {}", full_key, err);
        }
    }
}
