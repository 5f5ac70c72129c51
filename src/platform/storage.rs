//! Durable key-value storage
//!
//! The browser build uses LocalStorage; native builds and tests use an
//! in-memory map. Failures are reported as `None`/`false` and never panic.

use std::collections::HashMap;

/// String key-value storage
pub trait KeyValueStore {
    /// Read a value; `None` if missing or unreadable
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value; returns false if the write failed
    fn set(&mut self, key: &str, value: &str) -> bool;
    /// Remove a value if present
    fn remove(&mut self, key: &str);
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        match Self::storage() {
            Some(storage) => storage.set_item(key, value).is_ok(),
            None => false,
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        assert!(store.set("k", "v"));
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }
}
