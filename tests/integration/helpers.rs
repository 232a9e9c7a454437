//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use artivault_core::config::AppConfig;
use artivault_core::types::UserId;
use artivault_database::Repositories;
use artivault_entity::file::{File, Visibility};
use artivault_entity::version::Version;
use artivault_service::{ArtifactHub, ContentUpload, RequestContext};
use artivault_storage::MemoryStorageProvider;

/// Test application context
pub struct TestApp {
    /// The hub under test
    pub hub: ArtifactHub,
    /// Blob store backing the hub
    pub storage: MemoryStorageProvider,
    /// Owner of files created through [`TestApp::upload`]
    pub owner: RequestContext,
}

impl TestApp {
    /// Create a hub over in-memory repositories and storage
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Same as [`TestApp::new`] with custom settings
    pub fn with_config(config: AppConfig) -> Self {
        let storage = MemoryStorageProvider::new();
        let hub = ArtifactHub::new(Repositories::memory(), Arc::new(storage.clone()), &config);
        Self {
            hub,
            storage,
            owner: RequestContext::new(UserId::new()),
        }
    }

    /// A context for a fresh user
    pub fn stranger(&self) -> RequestContext {
        RequestContext::new(UserId::new())
    }

    /// Upload a private file owned by [`TestApp::owner`]
    pub async fn upload(&self, name: &str, body: &'static [u8]) -> (File, Version) {
        self.hub
            .upload(&self.owner, name, &content(name, body), Visibility::Private)
            .await
            .expect("Failed to upload test file")
    }
}

/// Upload payload with a text MIME type
pub fn content(name: &str, body: &'static [u8]) -> ContentUpload {
    ContentUpload::new(body, name).with_mime_type("text/plain")
}
