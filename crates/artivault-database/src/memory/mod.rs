//! In-memory repository implementations.
//!
//! All tables live behind one `tokio::sync::Mutex`, so every repository
//! call is a serializable critical section. Suitable for tests and
//! single-process experiments only; nothing is persisted.

mod file;
mod permission;
mod share;
mod version;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use artivault_core::types::{FileId, PageRequest, PageResponse, ShareId, UserId, VersionId};
use artivault_entity::file::File;
use artivault_entity::permission::Permission;
use artivault_entity::share::ShareLink;
use artivault_entity::version::Version;

/// Rows of every table.
#[derive(Debug, Default)]
struct Tables {
    files: HashMap<FileId, File>,
    permissions: HashMap<(FileId, UserId), Permission>,
    shares: HashMap<ShareId, ShareLink>,
    share_tokens: HashMap<String, ShareId>,
    versions: HashMap<VersionId, Version>,
}

impl Tables {
    fn versions_of(&self, file_id: FileId) -> impl Iterator<Item = &Version> {
        self.versions.values().filter(move |v| v.file_id == file_id)
    }

    fn active_file(&self, file_id: FileId) -> Option<&File> {
        self.files.get(&file_id).filter(|f| !f.is_deleted())
    }
}

/// In-memory store implementing every repository trait.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Protected tables.
    state: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sort newest first by `(created_at, id)` and cut one page.
fn newest_first<T, K: Ord>(
    mut rows: Vec<T>,
    key: impl Fn(&T) -> K,
    page: &PageRequest,
) -> PageResponse<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    PageResponse::from_ordered(rows, page)
}
