// src/storage.rs

//! Key-value snapshot storage.
//!
//! Store state is persisted as whole-value snapshots under well-known keys
//! ("product-storage", "cart-storage", "auth-storage"). [`StorageProvider`]
//! is the backend seam; the in-memory backend serves tests and ephemeral
//! runs, the file backend keeps one file per key under the platform data
//! directory. A browser-backed provider can implement the same trait.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use crate::error::{Error, Result, StorageOperation};

/// Snapshot key for catalog products and favorites
pub const PRODUCT_STORE_KEY: &str = "product-storage";
/// Snapshot key for cart contents
pub const CART_STORE_KEY: &str = "cart-storage";
/// Snapshot key for the authenticated session
pub const AUTH_STORE_KEY: &str = "auth-storage";

/// Backend-agnostic key-value storage
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
    async fn clear(&self) -> Result<()>;
}

/// Shared handle to a storage backend
pub type SharedStorage = Arc<dyn StorageProvider>;

/// Serializes a value to JSON and stores it under `key`
pub async fn save_snapshot<T: Serialize>(
    storage: &dyn StorageProvider,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| {
        Error::storage(
            None,
            Some(key.to_string()),
            StorageOperation::Set,
            format!("failed to serialize snapshot: {}", e),
        )
    })?;
    storage.set(key, &bytes).await
}

/// Loads and deserializes the value stored under `key`, `None` when absent
pub async fn load_snapshot<T: DeserializeOwned>(
    storage: &dyn StorageProvider,
    key: &str,
) -> Result<Option<T>> {
    let Some(bytes) = storage.get(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&bytes).map_err(|e| {
        Error::storage(
            None,
            Some(key.to_string()),
            StorageOperation::Get,
            format!("failed to deserialize snapshot: {}", e),
        )
    })?;
    Ok(Some(value))
}

/// Process-local storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: parking_lot::RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

/// One file per key under a storage directory
#[derive(Debug)]
pub struct FileStorage {
    storage_path: PathBuf,
}

impl FileStorage {
    /// Creates a file backend rooted at `data_dir`, or the platform data
    /// directory when unset
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        let base = data_dir.unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("data"))
                .join("nectar")
        });
        Self {
            storage_path: base.join("storage"),
        }
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        self.storage_path.join(format!("{}.bin", safe_key))
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.storage_path).await.map_err(|e| {
            Error::storage(
                None,
                None,
                StorageOperation::Set,
                format!(
                    "failed to create storage directory {}: {}",
                    self.storage_path.display(),
                    e
                ),
            )
        })
    }
}

#[async_trait]
impl StorageProvider for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_to_path(key);
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(
                None,
                Some(key.to_string()),
                StorageOperation::Get,
                format!("failed to read key {}: {}", key, e),
            )),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.key_to_path(key);
        fs::write(&path, value).await.map_err(|e| {
            Error::storage(
                None,
                Some(key.to_string()),
                StorageOperation::Set,
                format!("failed to write key {}: {}", key, e),
            )
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.key_to_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(
                None,
                Some(key.to_string()),
                StorageOperation::Delete,
                format!("failed to delete key {}: {}", key, e),
            )),
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = match fs::read_dir(&self.storage_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
            Err(e) => {
                return Err(Error::storage(
                    None,
                    None,
                    StorageOperation::List,
                    format!("failed to list storage directory: {}", e),
                ))
            }
        };

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            Error::storage(
                None,
                None,
                StorageOperation::List,
                format!("failed to read storage entry: {}", e),
            )
        })? {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(key) = name.strip_suffix(".bin") {
                    if key.starts_with(prefix) {
                        keys.push(key.to_string());
                    }
                }
            }
        }

        Ok(keys)
    }

    async fn clear(&self) -> Result<()> {
        for key in self.list_keys("").await? {
            self.delete(&key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("missing").await.unwrap(), None);

        storage.set("a", b"hello").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap(), Some(b"hello".to_vec()));

        storage.delete("a").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage_list_and_clear() {
        let storage = MemoryStorage::new();
        storage.set("cart-storage", b"1").await.unwrap();
        storage.set("product-storage", b"2").await.unwrap();

        let mut keys = storage.list_keys("").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["cart-storage", "product-storage"]);
        assert_eq!(storage.list_keys("cart").await.unwrap(), vec!["cart-storage"]);

        storage.clear().await.unwrap();
        assert!(storage.list_keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(Some(dir.path().to_path_buf()));

        assert_eq!(storage.get("product-storage").await.unwrap(), None);

        storage.set("product-storage", b"{}").await.unwrap();
        assert_eq!(
            storage.get("product-storage").await.unwrap(),
            Some(b"{}".to_vec())
        );

        let keys = storage.list_keys("product").await.unwrap();
        assert_eq!(keys, vec!["product-storage"]);

        storage.delete("product-storage").await.unwrap();
        assert_eq!(storage.get("product-storage").await.unwrap(), None);
        // Deleting an absent key is not an error
        storage.delete("product-storage").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(Some(dir.path().to_path_buf()));

        storage.set("a/b:c", b"x").await.unwrap();
        assert_eq!(storage.get("a/b:c").await.unwrap(), Some(b"x".to_vec()));
        assert_eq!(storage.list_keys("a_b").await.unwrap(), vec!["a_b_c"]);
    }

    #[tokio::test]
    async fn test_snapshot_helpers() {
        let storage = MemoryStorage::new();

        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Snapshot {
            items: Vec<String>,
        }

        let value = Snapshot {
            items: vec!["a".to_string(), "b".to_string()],
        };
        save_snapshot(&storage, "test", &value).await.unwrap();

        let loaded: Option<Snapshot> = load_snapshot(&storage, "test").await.unwrap();
        assert_eq!(loaded, Some(value));

        let missing: Option<Snapshot> = load_snapshot(&storage, "absent").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_snapshot_rejects_corrupt_payload() {
        let storage = MemoryStorage::new();
        storage.set("test", b"not json").await.unwrap();

        let loaded: Result<Option<Vec<String>>> = load_snapshot(&storage, "test").await;
        assert!(loaded.is_err());
    }
}
