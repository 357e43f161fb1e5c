//! In-memory key/value storage.

use std::{collections::HashMap, sync::RwLock};

use manka_core::{KeyValueStore, StorageError};

/// In-memory storage implementation.
///
/// Useful for tests and hosts that keep one process alive for the whole
/// session. Data is lost on restart.
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .values
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("isLogin").unwrap(), None);

        store.set("isLogin", "true").unwrap();
        assert_eq!(store.get("isLogin").unwrap().as_deref(), Some("true"));

        store.set("isLogin", "false").unwrap();
        assert_eq!(store.get("isLogin").unwrap().as_deref(), Some("false"));

        store.remove("isLogin").unwrap();
        assert_eq!(store.get("isLogin").unwrap(), None);
        store.remove("isLogin").unwrap();
    }
}
