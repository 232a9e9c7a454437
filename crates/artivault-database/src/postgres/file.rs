//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, UserId};
use artivault_entity::file::{File, Visibility};

use crate::error::db_error;
use crate::repositories::FileRepository;

/// PostgreSQL-backed [`FileRepository`].
#[derive(Debug, Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find file", e))
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files WHERE owner_id = $1 AND status = 'active'",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count files", e))?;

        let files = sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND status = 'active' \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list files", e))?;

        Ok(PageResponse::new(files, page, total as u64))
    }

    async fn set_visibility(&self, id: FileId, visibility: Visibility) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET visibility = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'active' RETURNING *",
        )
        .bind(id)
        .bind(visibility)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update file visibility", e))
    }

    async fn soft_delete(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET status = 'deleted', deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = 'active' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete file", e))
    }
}
