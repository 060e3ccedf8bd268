//! Durable key-value storage for the storefront state
//!
//! Three independent JSON values live under fixed keys. A missing key reads
//! as the default value. Writes replace the whole value (last writer wins).

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Key holding the cart items
pub const CART_KEY: &str = "cart";
/// Key holding the favorite products
pub const FAVORITES_KEY: &str = "favorites";
/// Key holding the signed-in user
pub const USER_INFO_KEY: &str = "userInfo";

/// Raw string storage addressed by key
pub trait DurableStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Load a JSON value for `key`, falling back to the default when absent.
pub fn load_json<T, S>(store: &S, key: &str) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
    S: DurableStore + ?Sized,
{
    match store.load(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

/// Save a JSON value for `key`.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
    S: DurableStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.save(key, &raw)
}

/// Process-local storage; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl DurableStore for FileStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;

        // Readers never observe a half-written file
        let target = self.path_for(key);
        let staging = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&staging, value).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&staging, &target).map_err(|e| Self::io_error(key, e))?;

        debug!("Persisted {} bytes under {}", value.len(), target.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_as_default() {
        let store = MemoryStore::new();
        let cart: Vec<String> = load_json(&store, CART_KEY).unwrap();
        assert!(cart.is_empty());
        let user: Option<String> = load_json(&store, USER_INFO_KEY).unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        save_json(&store, FAVORITES_KEY, &vec!["a", "b"]).unwrap();
        let favorites: Vec<String> = load_json(&other, FAVORITES_KEY).unwrap();
        assert_eq!(favorites, vec!["a", "b"]);
    }

    #[test]
    fn file_store_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state"));

        assert_eq!(store.load(CART_KEY).unwrap(), None);
        store.save(CART_KEY, "[1,2,3]").unwrap();
        assert_eq!(store.load(CART_KEY).unwrap().as_deref(), Some("[1,2,3]"));
        assert!(!dir.path().join("state").join("cart.json.tmp").exists());

        store.remove(CART_KEY).unwrap();
        store.remove(CART_KEY).unwrap();
        assert_eq!(store.load(CART_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save(CART_KEY, "{not json").unwrap();

        let result: StoreResult<Vec<String>> = load_json(&store, CART_KEY);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }
}
