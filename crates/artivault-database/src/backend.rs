//! Repository bundle selected from configuration.

use std::sync::Arc;

use tracing::info;

use artivault_core::config::{DatabaseConfig, DatabaseProvider};
use artivault_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::postgres::{
    PgFileRepository, PgPermissionRepository, PgShareRepository, PgVersionRepository,
};
use crate::repositories::{
    FileRepository, PermissionRepository, ShareRepository, VersionRepository,
};

/// One handle per repository, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    /// File rows.
    pub files: Arc<dyn FileRepository>,
    /// Permission rows.
    pub permissions: Arc<dyn PermissionRepository>,
    /// Share link rows.
    pub shares: Arc<dyn ShareRepository>,
    /// Version rows.
    pub versions: Arc<dyn VersionRepository>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

impl Repositories {
    /// Repositories over a PostgreSQL pool.
    pub fn postgres(pool: &DatabasePool) -> Self {
        let pool = pool.pool().clone();
        Self {
            files: Arc::new(PgFileRepository::new(pool.clone())),
            permissions: Arc::new(PgPermissionRepository::new(pool.clone())),
            shares: Arc::new(PgShareRepository::new(pool.clone())),
            versions: Arc::new(PgVersionRepository::new(pool)),
        }
    }

    /// Repositories over one shared in-memory store.
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            files: Arc::new(store.clone()),
            permissions: Arc::new(store.clone()),
            shares: Arc::new(store.clone()),
            versions: Arc::new(store),
        }
    }

    /// Build the backend named in configuration. Connects to PostgreSQL
    /// when selected; migrations are not run here.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        info!(provider = %config.provider, "Initializing repositories");
        match config.provider {
            DatabaseProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                Ok(Self::postgres(&pool))
            }
            DatabaseProvider::Memory => Ok(Self::memory()),
        }
    }
}
