//! Blob Store Adapters
//!
//! Implements the `BlobStore` port on the local filesystem and in memory.
//!
//! The file store keeps one file per payload, named by its content id, and
//! writes through a temp file + `sync_all` + rename so a crash never leaves a
//! truncated payload under a valid name.

use crate::ports::outbound::BlobStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{BackendError, ContentId};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

/// Payloads stored as files under one directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Open (creating if needed) the store directory.
    ///
    /// Fails with `Storage` when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            BackendError::Storage(format!("cannot create {}: {}", dir.display(), e))
        })?;
        info!("[fh-backend] Blob store at {}", dir.display());
        Ok(Self { dir })
    }

    /// Directory holding the payload files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &ContentId) -> PathBuf {
        self.dir.join(id.to_string())
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn put(&self, id: &ContentId, data: &[u8]) -> Result<(), BackendError> {
        let path = self.path_for(id);
        // Unique per writer: concurrent stores of the same payload must not
        // share a temp file.
        let temp_path = self.dir.join(format!(".{}.{}.tmp", id, Uuid::new_v4()));

        let write = async {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            tokio::fs::rename(&temp_path, &path).await?;
            Ok::<(), std::io::Error>(())
        };

        if let Err(e) = write.await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(BackendError::Storage(format!("write {}: {}", id, e)));
        }

        debug!("[fh-backend] Stored {} ({} bytes)", id, data.len());
        Ok(())
    }

    async fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, BackendError> {
        match tokio::fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Storage(format!("read {}: {}", id, e))),
        }
    }

    async fn contains(&self, id: &ContentId) -> Result<bool, BackendError> {
        tokio::fs::try_exists(self.path_for(id))
            .await
            .map_err(|e| BackendError::Storage(format!("stat {}: {}", id, e)))
    }
}

/// Payloads kept in a map.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Overwrite the bytes under `id` without checking them.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn corrupt(&self, id: &ContentId, bytes: Vec<u8>) {
        self.blobs.write().insert(*id, bytes);
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, id: &ContentId, data: &[u8]) -> Result<(), BackendError> {
        self.blobs.write().insert(*id, data.to_vec());
        Ok(())
    }

    async fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.blobs.read().get(id).cloned())
    }

    async fn contains(&self, id: &ContentId) -> Result<bool, BackendError> {
        Ok(self.blobs.read().contains_key(id))
    }
}
