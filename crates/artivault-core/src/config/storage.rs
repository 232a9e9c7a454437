//! Content storage configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which content storage provider to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderKind {
    /// Blobs written under `storage.local.root_path`.
    Local,
    /// Blobs kept in process memory.
    #[default]
    Memory,
}

impl fmt::Display for StorageProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider selection.
    #[serde(default)]
    pub provider: StorageProviderKind,
    /// Maximum accepted size of a single content upload (default 512 MB).
    #[serde(default = "default_max_content_size")]
    pub max_content_size_bytes: u64,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProviderKind::default(),
            max_content_size_bytes: default_max_content_size(),
            local: LocalStorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for local blob storage.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

fn default_max_content_size() -> u64 {
    512 * 1024 * 1024
}

fn default_local_root() -> String {
    "./data/storage".to_string()
}
