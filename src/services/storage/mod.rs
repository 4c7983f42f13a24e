//! Object storage for raw upload bytes.
//!
//! Uploads are stored under an opaque reference returned by `put`; the
//! ingestion pipeline reads them back by that reference only. Backends
//! are pluggable: a disk store for the server and an in-memory store for
//! tests.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::error::{ServiceError, ServiceResult};

/// Abstract object storage.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores bytes under `key` and returns an opaque reference.
    async fn put(&self, data: &[u8], key: &str) -> ServiceResult<String>;

    /// Reads the bytes behind a reference returned by `put`.
    async fn get(&self, storage_ref: &str) -> ServiceResult<Vec<u8>>;

    /// Deletes the object. Returns false if it did not exist.
    async fn delete(&self, storage_ref: &str) -> ServiceResult<bool>;
}

/// Rejects keys that could escape the storage root.
fn validate_key(key: &str) -> ServiceResult<()> {
    if key.is_empty()
        || key.contains("..")
        || key.starts_with('/')
        || key.contains('\\')
    {
        return Err(ServiceError::Validation(format!(
            "invalid storage key: {key:?}"
        )));
    }
    Ok(())
}

/// Disk-backed storage rooted at a directory.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the root directory if missing.
    pub async fn init(&self) -> ServiceResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    fn path_for(&self, storage_ref: &str) -> ServiceResult<PathBuf> {
        let key = storage_ref
            .strip_prefix("file://")
            .ok_or_else(|| ServiceError::Storage(format!("unknown reference {storage_ref:?}")))?;
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStorage for DiskStorage {
    async fn put(&self, data: &[u8], key: &str) -> ServiceResult<String> {
        validate_key(key)?;
        let path = self.root.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(format!("file://{}", key))
    }

    async fn get(&self, storage_ref: &str) -> ServiceResult<Vec<u8>> {
        let path = self.path_for(storage_ref)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| ServiceError::Storage(format!("{}: {}", path.display(), e)))
    }

    async fn delete(&self, storage_ref: &str) -> ServiceResult<bool> {
        let path = self.path_for(storage_ref)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }
}

/// In-memory storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, data: &[u8], key: &str) -> ServiceResult<String> {
        validate_key(key)?;
        let storage_ref = format!("mem://{}", key);
        self.objects
            .write()
            .await
            .insert(storage_ref.clone(), data.to_vec());
        Ok(storage_ref)
    }

    async fn get(&self, storage_ref: &str) -> ServiceResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(storage_ref)
            .cloned()
            .ok_or_else(|| ServiceError::Storage(format!("object not found: {storage_ref}")))
    }

    async fn delete(&self, storage_ref: &str) -> ServiceResult<bool> {
        Ok(self.objects.write().await.remove(storage_ref).is_some())
    }
}
