//! # artivault-storage
//!
//! Content storage provider implementations for Artivault: the local
//! filesystem and an in-memory map. Blobs are addressed by opaque keys.

pub mod checksum;
pub mod providers;

use std::sync::Arc;

use tracing::info;

use artivault_core::config::{StorageConfig, StorageProviderKind};
use artivault_core::result::AppResult;
use artivault_core::traits::StorageProvider;

pub use checksum::sha256_hex;
pub use providers::{LocalStorageProvider, MemoryStorageProvider};

/// Construct the provider named in configuration.
pub async fn build_provider(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    info!(provider = %config.provider, "Initializing content storage");
    match config.provider {
        StorageProviderKind::Local => {
            let provider = LocalStorageProvider::new(&config.local.root_path).await?;
            Ok(Arc::new(provider))
        }
        StorageProviderKind::Memory => Ok(Arc::new(MemoryStorageProvider::new())),
    }
}
