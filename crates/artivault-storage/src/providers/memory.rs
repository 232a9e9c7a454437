//! In-memory storage provider.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::traits::StorageProvider;

/// Storage provider keeping blobs in a concurrent map.
///
/// Clones share the same blobs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageProvider {
    blobs: Arc<DashMap<String, Bytes>>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read_bytes(&self, key: &str) -> AppResult<Bytes> {
        self.blobs
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {key}")))
    }

    async fn write(&self, key: &str, data: Bytes) -> AppResult<()> {
        debug!(key, bytes = data.len(), "Stored blob in memory");
        self.blobs.insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.blobs.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.blobs.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let provider = MemoryStorageProvider::new();
        provider
            .write("files/a", Bytes::from_static(b"hello"))
            .await
            .expect("write");
        assert!(provider.exists("files/a").await.expect("exists"));
        assert_eq!(
            provider.read_bytes("files/a").await.expect("read"),
            Bytes::from_static(b"hello")
        );

        provider.delete("files/a").await.expect("delete");
        let err = provider.read_bytes("files/a").await.unwrap_err();
        assert!(err.is_not_found());
        provider.delete("files/a").await.expect("delete is idempotent");
    }
}
