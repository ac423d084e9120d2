use std::collections::HashMap;
use std::sync::Mutex;

use super::{Result, StorageError};

/// Narrow contract over a durable key-value store.
///
/// `get` on a key that was never written (or was removed) must return
/// [`StorageError::NotFound`] so callers can tell "absent" apart from
/// "unreadable".
pub trait PersistenceGateway: Send + Sync {
    fn get(&self, key: &str) -> Result<Vec<u8>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process gateway backed by a map
#[derive(Default)]
pub struct MemoryGateway {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}

impl PersistenceGateway for MemoryGateway {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_not_found() {
        let gateway = MemoryGateway::new();
        assert!(matches!(gateway.get("records"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_set_get_remove() {
        let gateway = MemoryGateway::new();
        gateway.set("records", b"[]").unwrap();
        assert_eq!(gateway.get("records").unwrap(), b"[]".to_vec());

        gateway.remove("records").unwrap();
        assert!(!gateway.contains("records"));
        // Removing twice is not an error
        gateway.remove("records").unwrap();
    }
}
