//! Key/value storage for demo session state.
//!
//! The controller never touches a global store; it is handed a
//! [`KeyValueStore`] at construction. Three implementations exist:
//!
//! - [`InMemoryStore`] for tests and embedding
//! - [`FileStore`], a JSON file used by the CLI
//! - browser `localStorage` (in `metering-demo-web`)
//!
//! # Security Warning
//!
//! None of these stores are suitable for production use. Values are kept in
//! plaintext and can be edited by anyone with access to the device.
//!
//! # Examples
//!
//! ```
//! use metering_demo_core::storage::{InMemoryStore, KeyValueStore, keys};
//!
//! # fn example() -> metering_demo_core::errors::StoreResult<()> {
//! let store = InMemoryStore::new();
//! store.set(keys::USERNAME, "alice")?;
//! assert_eq!(store.get(keys::USERNAME)?, Some("alice".to_string()));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::errors::{StoreError, StoreResult};

/// Fixed keys under which demo state is stored.
pub mod keys {
    /// Publisher Provided ID
    pub const PPID: &str = "meteringPpid";
    /// When the demo user registered
    pub const REGISTRATION_TIMESTAMP: &str = "meteringRegistrationTimestamp";
    /// Display name used for the greeting
    pub const USERNAME: &str = "meteringUsername";

    /// Every key owned by the demo, in deletion order.
    pub const ALL: [&str; 3] = [PPID, REGISTRATION_TIMESTAMP, USERNAME];
}

/// Durable string-to-string map.
///
/// Presence or absence of a key is the only contract. Removing a missing key
/// is not an error.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Remove every key in `keys`.
    ///
    /// Each key is attempted even if an earlier removal fails; the first
    /// error is returned afterwards.
    fn remove_all(&self, keys: &[&str]) -> StoreResult<()> {
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.remove(key) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn lock_error(context: &str) -> StoreError {
    StoreError::Unavailable(format!("InMemoryStore: lock poisoned during {}", context))
}

/// In-memory store. Contents are lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored entries.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| lock_error("get"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| lock_error("set"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| lock_error("remove"))?;
        entries.remove(key);
        Ok(())
    }
}

/// JSON-file backed store, the CLI's stand-in for browser `localStorage`.
///
/// Every operation re-reads the file, so several processes sharing a
/// directory see each other's writes (last writer wins).
pub struct FileStore {
    storage_dir: PathBuf,
}

impl FileStore {
    /// File name used inside the storage directory.
    pub const FILE_NAME: &'static str = "local_storage.json";

    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            storage_dir: storage_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.storage_dir.join(Self::FILE_NAME)
    }

    /// All entries currently on disk.
    pub fn entries(&self) -> StoreResult<BTreeMap<String, String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = std::fs::read_to_string(&path)?;
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        std::fs::create_dir_all(&self.storage_dir)?;
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(self.path(), json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.remove_all(&[key])
    }

    /// Single read-modify-write, so the file never holds a partial reset.
    fn remove_all(&self, keys: &[&str]) -> StoreResult<()> {
        let mut entries = self.entries()?;
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() != before {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get(keys::PPID).unwrap(), None);

        store.set(keys::PPID, "ppid1").unwrap();
        assert_eq!(store.get(keys::PPID).unwrap(), Some("ppid1".to_string()));

        store.remove(keys::PPID).unwrap();
        assert_eq!(store.get(keys::PPID).unwrap(), None);

        // Removing twice is fine
        store.remove(keys::PPID).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists_between_instances() {
        let temp_dir = tempfile::tempdir().unwrap();

        let store = FileStore::new(temp_dir.path());
        store.set(keys::USERNAME, "alice").unwrap();
        store.set(keys::PPID, "ppid7").unwrap();

        let reopened = FileStore::new(temp_dir.path());
        assert_eq!(reopened.get(keys::USERNAME).unwrap(), Some("alice".into()));
        assert_eq!(reopened.entries().unwrap().len(), 2);

        reopened.remove(keys::USERNAME).unwrap();
        assert_eq!(store.get(keys::USERNAME).unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_all_in_one_write() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        for key in keys::ALL {
            store.set(key, "x").unwrap();
        }
        store.set("unrelated", "kept").unwrap();

        store.remove_all(&keys::ALL).unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("unrelated").map(String::as_str), Some("kept"));
    }

    #[test]
    fn test_file_store_missing_directory_reads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path().join("not-created-yet"));

        assert_eq!(store.get(keys::PPID).unwrap(), None);
        store.remove(keys::PPID).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.get(keys::PPID).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
