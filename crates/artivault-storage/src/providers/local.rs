//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use artivault_core::error::{AppError, ErrorKind};
use artivault_core::result::AppResult;
use artivault_core::traits::StorageProvider;

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a key to a path within the root. Keys that would escape the
    /// root are rejected.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let clean = Path::new(key.trim_start_matches('/'));
        let escapes = clean
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.trim().is_empty() || escapes {
            return Err(AppError::validation(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn read_bytes(&self, key: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(key)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to read blob: {key}"), e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, key: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write blob: {key}"), e)
        })?;

        debug!(key, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {key}"),
                e,
            )),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_path = self.resolve(key)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to stat blob: {key}"), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider() -> (tempfile::TempDir, LocalStorageProvider) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("blobs");
        let provider = LocalStorageProvider::new(root.to_str().expect("utf-8 path"))
            .await
            .expect("provider");
        (dir, provider)
    }

    #[tokio::test]
    async fn test_round_trip_in_nested_key() {
        let (_dir, provider) = provider().await;
        assert!(provider.health_check().await.expect("health"));

        let key = "files/abc/def";
        provider
            .write(key, Bytes::from_static(b"payload"))
            .await
            .expect("write");
        assert!(provider.exists(key).await.expect("exists"));
        assert_eq!(
            provider.read_bytes(key).await.expect("read").as_ref(),
            b"payload"
        );

        provider.delete(key).await.expect("delete");
        assert!(!provider.exists(key).await.expect("exists"));
        provider.delete(key).await.expect("missing delete is ok");
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let (_dir, provider) = provider().await;
        let err = provider.read_bytes("files/none").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (_dir, provider) = provider().await;
        for key in ["../escape", "files/../../escape", ""] {
            let err = provider
                .write(key, Bytes::from_static(b"x"))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "key {key:?}");
        }
    }
}
