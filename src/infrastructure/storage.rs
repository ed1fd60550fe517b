use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::domain::ports::{StateStorage, StorageError};

/// Durable state storage: one JSON file per namespace under a root
/// directory. Mirrors the browser's per-key local storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.root.join(format!("{namespace}.json"))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, namespace: &str) -> Option<String> {
        fs::read_to_string(self.path_for(namespace)).ok()
    }

    fn save(&self, namespace: &str, payload: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(namespace), payload)?;
        Ok(())
    }
}

/// Non-durable storage for ephemeral sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl StateStorage for MemoryStorage {
    fn load(&self, namespace: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(namespace).cloned(),
            Err(poisoned) => poisoned.into_inner().get(namespace).cloned(),
        }
    }

    fn save(&self, namespace: &str, payload: &str) -> Result<(), StorageError> {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(namespace.to_string(), payload.to_string());
            }
            Err(poisoned) => {
                poisoned
                    .into_inner()
                    .insert(namespace.to_string(), payload.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.load("cart.v1"), None);

        storage.save("cart.v1", "[]").expect("save");
        assert_eq!(storage.load("cart.v1"), Some("[]".to_string()));
    }

    #[test]
    fn namespaces_are_independent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());

        storage.save("cart.v1", "[1]").expect("save");
        storage.save("checkout.v1", "{}").expect("save");

        assert_eq!(storage.load("cart.v1"), Some("[1]".to_string()));
        assert_eq!(storage.load("checkout.v1"), Some("{}".to_string()));
    }

    #[test]
    fn memory_storage_shares_entries_between_clones() {
        let storage = MemoryStorage::default();
        storage.save("cart.v1", "[]").expect("save");

        let clone = storage.clone();
        assert_eq!(clone.load("cart.v1"), Some("[]".to_string()));
    }
}
