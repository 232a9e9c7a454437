//! File repository trait.

use async_trait::async_trait;

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, UserId};
use artivault_entity::file::{File, Visibility};

/// Storage of file rows.
///
/// Files are created together with their first version through
/// [`VersionRepository::insert_initial`](super::VersionRepository::insert_initial).
#[async_trait]
pub trait FileRepository: Send + Sync + 'static {
    /// Find a file by ID, including soft-deleted ones.
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>>;

    /// List active files owned by a user, newest first.
    async fn list_by_owner(&self, owner_id: UserId, page: &PageRequest)
    -> AppResult<PageResponse<File>>;

    /// Change visibility of an active file. `None` if absent or deleted.
    async fn set_visibility(&self, id: FileId, visibility: Visibility) -> AppResult<Option<File>>;

    /// Soft-delete an active file. `None` if absent or already deleted.
    async fn soft_delete(&self, id: FileId) -> AppResult<Option<File>>;
}
