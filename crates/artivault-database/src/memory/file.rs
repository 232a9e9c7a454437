use async_trait::async_trait;
use chrono::Utc;

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, UserId};
use artivault_entity::file::{File, FileStatus, Visibility};

use super::{MemoryStore, newest_first};
use crate::repositories::FileRepository;

#[async_trait]
impl FileRepository for MemoryStore {
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        let state = self.state.lock().await;
        Ok(state.files.get(&id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let state = self.state.lock().await;
        let rows = state
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && !f.is_deleted())
            .cloned()
            .collect();
        Ok(newest_first(rows, |f: &File| (f.created_at, f.id), page))
    }

    async fn set_visibility(&self, id: FileId, visibility: Visibility) -> AppResult<Option<File>> {
        let mut state = self.state.lock().await;
        Ok(state
            .files
            .get_mut(&id)
            .filter(|f| !f.is_deleted())
            .map(|f| {
                f.visibility = visibility;
                f.updated_at = Utc::now();
                f.clone()
            }))
    }

    async fn soft_delete(&self, id: FileId) -> AppResult<Option<File>> {
        let mut state = self.state.lock().await;
        Ok(state
            .files
            .get_mut(&id)
            .filter(|f| !f.is_deleted())
            .map(|f| {
                let now = Utc::now();
                f.status = FileStatus::Deleted;
                f.deleted_at = Some(now);
                f.updated_at = now;
                f.clone()
            }))
    }
}
