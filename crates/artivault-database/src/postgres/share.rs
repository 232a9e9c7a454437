//! Share link repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, ShareId};
use artivault_entity::share::{NewShareLink, ShareLink, ShareLinkPatch};

use crate::error::db_error;
use crate::repositories::ShareRepository;

/// PostgreSQL-backed [`ShareRepository`].
#[derive(Debug, Clone)]
pub struct PgShareRepository {
    pool: PgPool,
}

impl PgShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareRepository for PgShareRepository {
    async fn create(&self, data: &NewShareLink) -> AppResult<ShareLink> {
        sqlx::query_as::<_, ShareLink>(
            "INSERT INTO share_links \
             (id, file_id, token, created_by, level, max_downloads, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(ShareId::new())
        .bind(data.file_id)
        .bind(&data.token)
        .bind(data.created_by)
        .bind(data.level)
        .bind(data.max_downloads)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create share link", e))
    }

    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLink>("SELECT * FROM share_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find share link", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLink>("SELECT * FROM share_links WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find share link by token", e))
    }

    async fn update(&self, id: ShareId, patch: &ShareLinkPatch) -> AppResult<Option<ShareLink>> {
        sqlx::query_as::<_, ShareLink>(
            "UPDATE share_links SET \
             level = COALESCE($2, level), \
             max_downloads = CASE WHEN $3 THEN $4 ELSE max_downloads END, \
             expires_at = CASE WHEN $5 THEN $6 ELSE expires_at END, \
             status = COALESCE($7, status), \
             updated_at = $8 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.level)
        .bind(patch.max_downloads.is_some())
        .bind(patch.max_downloads.flatten())
        .bind(patch.expires_at.is_some())
        .bind(patch.expires_at.flatten())
        .bind(patch.status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update share link", e))
    }

    async fn try_record_download(
        &self,
        id: ShareId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareLink>> {
        // The row lock taken by UPDATE serializes concurrent downloads; the
        // WHERE clause is re-evaluated against the latest committed count.
        sqlx::query_as::<_, ShareLink>(
            "UPDATE share_links SET download_count = download_count + 1, \
             last_accessed_at = $2, updated_at = $2 \
             WHERE id = $1 AND status = 'active' \
             AND (expires_at IS NULL OR expires_at > $2) \
             AND (max_downloads IS NULL OR download_count < max_downloads) \
             RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record download", e))
    }

    async fn list(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLink>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM share_links WHERE file_id = $1")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count share links", e))?;

        let links = sqlx::query_as::<_, ShareLink>(
            "SELECT * FROM share_links WHERE file_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(file_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list share links", e))?;

        Ok(PageResponse::new(links, page, total as u64))
    }

    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<ShareLink>> {
        sqlx::query_as::<_, ShareLink>(
            "SELECT * FROM share_links WHERE file_id = $1 ORDER BY created_at, id",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list share links", e))
    }
}
