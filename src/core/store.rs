//! Key-value storage adapter backing the file repository

use std::path::Path;

use super::error::{Result, VaultError};

/// Minimal key-value contract consumed by the repository.
///
/// Keys and values are UTF-8 strings; `list` returns matching keys in
/// ascending lexicographic order. Writes are atomic from the caller's
/// perspective: a `set` either lands completely or errors.
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, overwriting any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Fetch the value stored under `key`, or `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove `key`. Deleting an absent key is a no-op success.
    fn delete(&self, key: &str) -> Result<()>;

    /// List all keys starting with `prefix`, in ascending order
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Embedded sled database implementing [`KeyValueStore`]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| VaultError::Storage(err.to_string()))?;
        }
        let db = sled::open(path)?;
        tracing::info!("Opened record store at {}", path.display());
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(raw) => {
                let value = String::from_utf8(raw.to_vec())
                    .map_err(|_| VaultError::Storage(format!("non-UTF-8 value under {key}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        // scan_prefix iterates in key order, so the result is already sorted
        let mut keys = Vec::new();
        for entry in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, _) = entry?;
            match String::from_utf8(key.to_vec()) {
                Ok(key) => keys.push(key),
                Err(_) => tracing::warn!("Skipping non-UTF-8 key in record store"),
            }
        }
        Ok(keys)
    }
}

/// BTreeMap-backed store for tests
#[cfg(test)]
pub struct MemoryStore {
    entries: std::sync::Mutex<std::collections::BTreeMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(std::collections::BTreeMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, std::collections::BTreeMap<String, String>> {
        self.entries.lock().expect("memory store poisoned")
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_store() -> (tempfile::TempDir, SledStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SledStore::open(&dir.path().join("records")).expect("open store");
        (dir, store)
    }

    #[test]
    fn test_set_get_roundtrip() {
        let (_dir, store) = open_temp_store();
        store.set("pdf:1_aa", "hello").unwrap();
        assert_eq!(store.get("pdf:1_aa").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_get_absent_key() {
        let (_dir, store) = open_temp_store();
        assert!(store.get("pdf:missing").unwrap().is_none());
    }

    #[test]
    fn test_delete_removes_and_is_idempotent() {
        let (_dir, store) = open_temp_store();
        store.set("pdf:1_aa", "hello").unwrap();
        store.delete("pdf:1_aa").unwrap();
        assert!(store.get("pdf:1_aa").unwrap().is_none());
        // second delete of an absent key is a no-op success
        store.delete("pdf:1_aa").unwrap();
    }

    #[test]
    fn test_list_filters_by_prefix_in_order() {
        let (_dir, store) = open_temp_store();
        store.set("pdf:2_bb", "b").unwrap();
        store.set("pdf:1_aa", "a").unwrap();
        store.set("cfg:theme", "dark").unwrap();

        let keys = store.list("pdf:").unwrap();
        assert_eq!(keys, vec!["pdf:1_aa".to_string(), "pdf:2_bb".to_string()]);
    }

    #[test]
    fn test_list_empty_prefix_no_matches() {
        let (_dir, store) = open_temp_store();
        assert!(store.list("pdf:").unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_matches_contract() {
        let store = MemoryStore::new();
        store.set("pdf:2_bb", "b").unwrap();
        store.set("pdf:1_aa", "a").unwrap();
        assert_eq!(
            store.list("pdf:").unwrap(),
            vec!["pdf:1_aa".to_string(), "pdf:2_bb".to_string()]
        );
        store.delete("pdf:1_aa").unwrap();
        store.delete("pdf:1_aa").unwrap();
        assert!(store.get("pdf:1_aa").unwrap().is_none());
    }
}
