//! Writing uploaded bytes to content storage.

use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::traits::StorageProvider;
use artivault_core::types::FileId;
use artivault_entity::file::ContentDescriptor;
use artivault_storage::sha256_hex;

/// Default MIME type when the uploader gives none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Raw content handed over by the request layer.
#[derive(Debug, Clone)]
pub struct ContentUpload {
    /// File contents.
    pub data: Bytes,
    /// MIME type reported by the client.
    pub mime_type: Option<String>,
    /// Client-side file name.
    pub original_name: String,
}

impl ContentUpload {
    /// Creates an upload.
    pub fn new(data: impl Into<Bytes>, original_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: None,
            original_name: original_name.into(),
        }
    }

    /// Sets the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Stores blobs under fresh opaque keys and describes them.
#[derive(Debug, Clone)]
pub struct ContentWriter {
    storage: Arc<dyn StorageProvider>,
    max_size_bytes: u64,
}

impl ContentWriter {
    /// Creates a writer.
    pub fn new(storage: Arc<dyn StorageProvider>, max_size_bytes: u64) -> Self {
        Self {
            storage,
            max_size_bytes,
        }
    }

    /// Reject content that may not be stored.
    pub fn validate(&self, upload: &ContentUpload) -> AppResult<()> {
        if upload.data.is_empty() {
            return Err(AppError::validation("Content must not be empty"));
        }
        if upload.data.len() as u64 > self.max_size_bytes {
            return Err(AppError::validation(format!(
                "Content size {} exceeds the maximum of {} bytes",
                upload.data.len(),
                self.max_size_bytes
            )));
        }
        if upload.original_name.trim().is_empty() {
            return Err(AppError::validation("Original file name must not be empty"));
        }
        Ok(())
    }

    /// Validate and store `upload` for `file_id`.
    pub async fn store(&self, file_id: FileId, upload: &ContentUpload) -> AppResult<ContentDescriptor> {
        self.validate(upload)?;
        let storage_key = format!("files/{file_id}/{}", Uuid::new_v4().simple());
        self.storage.write(&storage_key, upload.data.clone()).await?;
        Ok(ContentDescriptor {
            storage_key,
            size_bytes: upload.data.len() as i64,
            mime_type: upload
                .mime_type
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            original_name: upload.original_name.clone(),
            checksum_sha256: sha256_hex(&upload.data),
        })
    }

    /// Read a stored blob.
    pub async fn read(&self, content: &ContentDescriptor) -> AppResult<Bytes> {
        self.storage.read_bytes(&content.storage_key).await
    }

    /// Delete a blob, logging instead of failing.
    pub async fn discard(&self, content: &ContentDescriptor) {
        if let Err(e) = self.storage.delete(&content.storage_key).await {
            warn!(
                storage_key = %content.storage_key,
                error = %e,
                "Failed to delete orphaned blob"
            );
        }
    }
}
