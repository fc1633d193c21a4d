//! In-memory store for tests and ephemeral use.

use dashmap::DashMap;

use crate::PersistentStore;

/// Non-durable store backed by a concurrent map.
///
/// Useful in tests: sharing one `MemoryStore` across two queue instances
/// simulates a process restart against the same medium.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("missing").is_none());

        store.set("selected_currency", "KES");
        assert_eq!(store.get("selected_currency").as_deref(), Some("KES"));

        store.remove("selected_currency");
        assert!(store.get("selected_currency").is_none());

        // Removing again is a no-op
        store.remove("selected_currency");
    }

    #[test]
    fn test_overwrite() {
        let store = MemoryStore::new();
        store.set("k", "a");
        store.set("k", "b");
        assert_eq!(store.get("k").as_deref(), Some("b"));
        assert_eq!(store.len(), 1);
    }
}
