//! Permission repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, PermissionId, UserId};
use artivault_entity::permission::{NewPermission, Permission, PermissionPatch};

use crate::error::db_error;
use crate::repositories::PermissionRepository;

/// PostgreSQL-backed [`PermissionRepository`].
#[derive(Debug, Clone)]
pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    async fn upsert(&self, data: &NewPermission) -> AppResult<Permission> {
        // Concurrent grants for the same pair serialize on the unique key.
        sqlx::query_as::<_, Permission>(
            "INSERT INTO file_permissions \
             (id, file_id, grantee_id, level, granted_by, expires_at, status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'active') \
             ON CONFLICT (file_id, grantee_id) DO UPDATE SET \
             level = EXCLUDED.level, granted_by = EXCLUDED.granted_by, \
             expires_at = EXCLUDED.expires_at, status = 'active', updated_at = NOW() \
             RETURNING *",
        )
        .bind(PermissionId::new())
        .bind(data.file_id)
        .bind(data.grantee_id)
        .bind(data.level)
        .bind(data.granted_by)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to grant permission", e))
    }

    async fn find(&self, file_id: FileId, grantee_id: UserId) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM file_permissions WHERE file_id = $1 AND grantee_id = $2",
        )
        .bind(file_id)
        .bind(grantee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find permission", e))
    }

    async fn update(
        &self,
        file_id: FileId,
        grantee_id: UserId,
        patch: &PermissionPatch,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "UPDATE file_permissions SET \
             level = COALESCE($3, level), \
             expires_at = CASE WHEN $4 THEN $5 ELSE expires_at END, \
             status = COALESCE($6, status), \
             updated_at = NOW() \
             WHERE file_id = $1 AND grantee_id = $2 RETURNING *",
        )
        .bind(file_id)
        .bind(grantee_id)
        .bind(patch.level)
        .bind(patch.expires_at.is_some())
        .bind(patch.expires_at.flatten())
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update permission", e))
    }

    async fn revoke(&self, file_id: FileId, grantee_id: UserId) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "UPDATE file_permissions SET status = 'revoked', updated_at = NOW() \
             WHERE file_id = $1 AND grantee_id = $2 AND status = 'active' RETURNING *",
        )
        .bind(file_id)
        .bind(grantee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to revoke permission", e))
    }

    async fn list(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Permission>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM file_permissions WHERE file_id = $1")
                .bind(file_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count permissions", e))?;

        let rows = sqlx::query_as::<_, Permission>(
            "SELECT * FROM file_permissions WHERE file_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(file_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list permissions", e))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM file_permissions WHERE file_id = $1 ORDER BY created_at, id",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list permissions", e))
    }
}
