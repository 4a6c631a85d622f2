//! In-memory storage backend.

use super::DurableStorage;
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-lifetime key-value map used for tests and `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `key` is present, even if its value is empty.
    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.items
            .lock()
            .map(|items| items.contains_key(key))
            .unwrap_or(false)
    }
}

impl DurableStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_is_distinct_from_absent() {
        let storage = MemoryStorage::new();
        storage.set_item("key", "").unwrap();
        assert!(storage.contains("key"));
        assert_eq!(storage.get_item("key").unwrap().as_deref(), Some(""));

        storage.remove_item("key").unwrap();
        assert!(!storage.contains("key"));
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let storage = MemoryStorage::new();
        assert!(storage.remove_item("missing").is_ok());
    }
}
