//! Session-scoped key/value storage seam.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Minimal key/value store with session lifetime.
pub trait SessionStorage: Send + Sync {
    /// Value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: String);
    /// Delete the entry under `key`, if present.
    fn remove_item(&self, key: &str);
}

impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: String) {
        (**self).set_item(key, value);
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key);
    }
}

/// In-process [`SessionStorage`] backed by a map.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: String) {
        self.entries().insert(key.to_string(), value);
    }

    fn remove_item(&self, key: &str) {
        self.entries().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trips_entries() {
        let storage = MemorySessionStorage::new();
        assert_eq!(storage.get_item("k"), None);
        storage.set_item("k", "v1".to_string());
        storage.set_item("k", "v2".to_string());
        assert_eq!(storage.get_item("k").as_deref(), Some("v2"));
        storage.remove_item("k");
        storage.remove_item("missing");
        assert_eq!(storage.get_item("k"), None);
    }
}
