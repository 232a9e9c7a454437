use async_trait::async_trait;
use chrono::Utc;

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, PermissionId, UserId};
use artivault_entity::permission::{NewPermission, Permission, PermissionPatch, PermissionStatus};

use super::{MemoryStore, newest_first};
use crate::repositories::PermissionRepository;

#[async_trait]
impl PermissionRepository for MemoryStore {
    async fn upsert(&self, data: &NewPermission) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let row = state
            .permissions
            .entry((data.file_id, data.grantee_id))
            .and_modify(|p| {
                p.level = data.level;
                p.granted_by = data.granted_by;
                p.expires_at = data.expires_at;
                p.status = PermissionStatus::Active;
                p.updated_at = now;
            })
            .or_insert_with(|| Permission {
                id: PermissionId::new(),
                file_id: data.file_id,
                grantee_id: data.grantee_id,
                level: data.level,
                granted_by: data.granted_by,
                expires_at: data.expires_at,
                status: PermissionStatus::Active,
                created_at: now,
                updated_at: now,
            });
        Ok(row.clone())
    }

    async fn find(&self, file_id: FileId, grantee_id: UserId) -> AppResult<Option<Permission>> {
        let state = self.state.lock().await;
        Ok(state.permissions.get(&(file_id, grantee_id)).cloned())
    }

    async fn update(
        &self,
        file_id: FileId,
        grantee_id: UserId,
        patch: &PermissionPatch,
    ) -> AppResult<Option<Permission>> {
        let mut state = self.state.lock().await;
        Ok(state.permissions.get_mut(&(file_id, grantee_id)).map(|p| {
            patch.apply(p);
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn revoke(&self, file_id: FileId, grantee_id: UserId) -> AppResult<Option<Permission>> {
        let mut state = self.state.lock().await;
        Ok(state
            .permissions
            .get_mut(&(file_id, grantee_id))
            .filter(|p| p.status == PermissionStatus::Active)
            .map(|p| {
                p.status = PermissionStatus::Revoked;
                p.updated_at = Utc::now();
                p.clone()
            }))
    }

    async fn list(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Permission>> {
        let rows = self.find_all(file_id).await?;
        Ok(newest_first(rows, |p: &Permission| (p.created_at, p.id), page))
    }

    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<Permission>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Permission> = state
            .permissions
            .values()
            .filter(|p| p.file_id == file_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.created_at, p.id));
        Ok(rows)
    }
}
