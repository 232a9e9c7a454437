//! Version repository trait.

use async_trait::async_trait;

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, VersionId};
use artivault_entity::file::{File, NewFile};
use artivault_entity::version::{NewVersion, Rollback, Version};

/// Storage of version history and the file head it drives.
///
/// Every mutating method keeps exactly one current version per file and
/// keeps the file head equal to that version's content.
#[async_trait]
pub trait VersionRepository: Send + Sync + 'static {
    /// Insert a file row and its version "1.0" as one unit.
    async fn insert_initial(&self, file: &NewFile, change_note: Option<&str>)
    -> AppResult<(File, Version)>;

    /// Append a version after the latest one and make it current.
    ///
    /// The label is derived from the latest version while the file is
    /// locked. Fails with `NotFound` if the file is absent or deleted.
    async fn append(&self, data: &NewVersion) -> AppResult<(File, Version)>;

    /// Make `version_id` the current version of `file_id`.
    ///
    /// Fails with `NotFound` if the file is absent or deleted, or the
    /// version does not belong to it. A version that is already current is
    /// returned unchanged.
    async fn rollback(&self, file_id: FileId, version_id: VersionId) -> AppResult<Rollback>;

    /// Remove a non-current version and return it.
    ///
    /// Fails with `NotFound` if absent and `InvalidState` if current.
    async fn delete(&self, version_id: VersionId) -> AppResult<Version>;

    /// Find a version by ID.
    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<Version>>;

    /// The current version of a file.
    async fn current(&self, file_id: FileId) -> AppResult<Option<Version>>;

    /// The version with the highest sequence number.
    async fn latest(&self, file_id: FileId) -> AppResult<Option<Version>>;

    /// List a file's versions, newest first.
    async fn list(&self, file_id: FileId, page: &PageRequest) -> AppResult<PageResponse<Version>>;

    /// All of a file's versions, oldest first.
    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<Version>>;
}
