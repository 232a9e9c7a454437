//! Permission repository trait.

use async_trait::async_trait;

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, UserId};
use artivault_entity::permission::{NewPermission, Permission, PermissionPatch};

/// Storage of explicit per-user grants.
#[async_trait]
pub trait PermissionRepository: Send + Sync + 'static {
    /// Insert a grant, or overwrite level, expiry, and granter of the
    /// existing `(file_id, grantee_id)` row and reactivate it.
    async fn upsert(&self, data: &NewPermission) -> AppResult<Permission>;

    /// Find the row for `(file_id, grantee_id)` in any status.
    async fn find(&self, file_id: FileId, grantee_id: UserId) -> AppResult<Option<Permission>>;

    /// Apply a partial update. `None` if no row exists.
    async fn update(
        &self,
        file_id: FileId,
        grantee_id: UserId,
        patch: &PermissionPatch,
    ) -> AppResult<Option<Permission>>;

    /// Move an active row to revoked. `None` if there is no active row.
    async fn revoke(&self, file_id: FileId, grantee_id: UserId) -> AppResult<Option<Permission>>;

    /// List a file's rows, newest first.
    async fn list(&self, file_id: FileId, page: &PageRequest)
    -> AppResult<PageResponse<Permission>>;

    /// All of a file's rows.
    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<Permission>>;
}
