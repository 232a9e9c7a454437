//! Storage provider trait for pluggable content backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for content storage backends.
///
/// Keys are opaque strings chosen by the caller. The [`StorageProvider`]
/// trait is defined here in `artivault-core` and implemented in
/// `artivault-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a blob into memory.
    async fn read_bytes(&self, key: &str) -> AppResult<Bytes>;

    /// Write bytes under the given key, replacing any previous blob.
    async fn write(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Delete the blob stored under the given key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a blob exists under the given key.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}
