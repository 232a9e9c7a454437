//! Version repository implementation.
//!
//! Every mutation runs in one transaction that first locks the file row
//! with `SELECT ... FOR UPDATE`, so concurrent appends and rollbacks on the
//! same file are serialized. The partial unique index on
//! `file_versions (file_id) WHERE is_current` rejects any interleaving
//! that would leave two current versions.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, UserId, VersionId};
use artivault_entity::file::{ContentDescriptor, File, NewFile};
use artivault_entity::version::{INITIAL_LABEL, NewVersion, Rollback, Version, next_label};

use crate::error::db_error;
use crate::repositories::VersionRepository;

/// PostgreSQL-backed [`VersionRepository`].
#[derive(Debug, Clone)]
pub struct PgVersionRepository {
    pool: PgPool,
}

impl PgVersionRepository {
    /// Create a new version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))
    }
}

async fn lock_active_file(
    tx: &mut Transaction<'static, Postgres>,
    file_id: FileId,
) -> AppResult<File> {
    sqlx::query_as::<_, File>(
        "SELECT * FROM files WHERE id = $1 AND status = 'active' FOR UPDATE",
    )
    .bind(file_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to lock file", e))?
    .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
}

async fn insert_version(
    tx: &mut Transaction<'static, Postgres>,
    file_id: FileId,
    sequence_number: i32,
    label: &str,
    content: &ContentDescriptor,
    change_note: Option<&str>,
    created_by: UserId,
) -> AppResult<Version> {
    sqlx::query_as::<_, Version>(
        "INSERT INTO file_versions \
         (id, file_id, sequence_number, version_label, storage_key, size_bytes, mime_type, \
          original_name, checksum_sha256, change_note, created_by, is_current) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE) RETURNING *",
    )
    .bind(VersionId::new())
    .bind(file_id)
    .bind(sequence_number)
    .bind(label)
    .bind(&content.storage_key)
    .bind(content.size_bytes)
    .bind(&content.mime_type)
    .bind(&content.original_name)
    .bind(&content.checksum_sha256)
    .bind(change_note)
    .bind(created_by)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert version", e))
}

async fn write_head(
    tx: &mut Transaction<'static, Postgres>,
    file_id: FileId,
    content: &ContentDescriptor,
) -> AppResult<File> {
    sqlx::query_as::<_, File>(
        "UPDATE files SET storage_key = $2, size_bytes = $3, mime_type = $4, \
         original_name = $5, checksum_sha256 = $6, updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(file_id)
    .bind(&content.storage_key)
    .bind(content.size_bytes)
    .bind(&content.mime_type)
    .bind(&content.original_name)
    .bind(&content.checksum_sha256)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to update file head", e))
}

async fn clear_current(
    tx: &mut Transaction<'static, Postgres>,
    file_id: FileId,
) -> AppResult<Option<Version>> {
    sqlx::query_as::<_, Version>(
        "UPDATE file_versions SET is_current = FALSE \
         WHERE file_id = $1 AND is_current RETURNING *",
    )
    .bind(file_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to clear current version", e))
}

async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| db_error("Failed to commit transaction", e))
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn insert_initial(
        &self,
        file: &NewFile,
        change_note: Option<&str>,
    ) -> AppResult<(File, Version)> {
        let mut tx = self.begin().await?;

        let content = &file.content;
        let created = sqlx::query_as::<_, File>(
            "INSERT INTO files \
             (id, owner_id, name, visibility, status, storage_key, size_bytes, mime_type, \
              original_name, checksum_sha256) \
             VALUES ($1, $2, $3, $4, 'active', $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(file.id)
        .bind(file.owner_id)
        .bind(&file.name)
        .bind(file.visibility)
        .bind(&content.storage_key)
        .bind(content.size_bytes)
        .bind(&content.mime_type)
        .bind(&content.original_name)
        .bind(&content.checksum_sha256)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create file", e))?;

        let version = insert_version(
            &mut tx,
            file.id,
            1,
            INITIAL_LABEL,
            content,
            change_note,
            file.owner_id,
        )
        .await?;

        commit(tx).await?;
        Ok((created, version))
    }

    async fn append(&self, data: &NewVersion) -> AppResult<(File, Version)> {
        let mut tx = self.begin().await?;
        lock_active_file(&mut tx, data.file_id).await?;

        let latest: Option<(i32, String)> = sqlx::query_as(
            "SELECT sequence_number, version_label FROM file_versions \
             WHERE file_id = $1 ORDER BY sequence_number DESC LIMIT 1",
        )
        .bind(data.file_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to find latest version", e))?;

        let sequence_number = latest.as_ref().map_or(1, |(seq, _)| seq + 1);
        let label = next_label(latest.as_ref().map(|(_, label)| label.as_str()));
        debug!(file_id = %data.file_id, label = %label, "Appending version");

        clear_current(&mut tx, data.file_id).await?;
        let version = insert_version(
            &mut tx,
            data.file_id,
            sequence_number,
            &label,
            &data.content,
            data.change_note.as_deref(),
            data.created_by,
        )
        .await?;
        let file = write_head(&mut tx, data.file_id, &data.content).await?;

        commit(tx).await?;
        Ok((file, version))
    }

    async fn rollback(&self, file_id: FileId, version_id: VersionId) -> AppResult<Rollback> {
        let mut tx = self.begin().await?;
        lock_active_file(&mut tx, file_id).await?;

        let target = sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE id = $1 AND file_id = $2",
        )
        .bind(version_id)
        .bind(file_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to find version", e))?
        .ok_or_else(|| {
            AppError::not_found(format!("Version {version_id} not found for file {file_id}"))
        })?;

        if target.is_current {
            commit(tx).await?;
            return Ok(Rollback {
                current: target,
                previous: None,
            });
        }

        let previous = clear_current(&mut tx, file_id).await?;
        let current = sqlx::query_as::<_, Version>(
            "UPDATE file_versions SET is_current = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(version_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to set current version", e))?;
        write_head(&mut tx, file_id, &current.content).await?;

        commit(tx).await?;
        Ok(Rollback { current, previous })
    }

    async fn delete(&self, version_id: VersionId) -> AppResult<Version> {
        let mut tx = self.begin().await?;

        let file_id: FileId =
            sqlx::query_scalar("SELECT file_id FROM file_versions WHERE id = $1")
                .bind(version_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to find version", e))?
                .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;

        // Lock the file row in any status so a concurrent rollback cannot
        // make this version current between the check and the delete.
        sqlx::query("SELECT id FROM files WHERE id = $1 FOR UPDATE")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock file", e))?;

        let version = sqlx::query_as::<_, Version>("SELECT * FROM file_versions WHERE id = $1")
            .bind(version_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to find version", e))?
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;

        if version.is_current {
            return Err(AppError::invalid_state(format!(
                "Version {} is the current version of file {file_id} and cannot be deleted",
                version.version_label
            )));
        }

        sqlx::query("DELETE FROM file_versions WHERE id = $1")
            .bind(version_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete version", e))?;

        commit(tx).await?;
        Ok(version)
    }

    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>("SELECT * FROM file_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find version", e))
    }

    async fn current(&self, file_id: FileId) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND is_current",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find current version", e))
    }

    async fn latest(&self, file_id: FileId) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE file_id = $1 \
             ORDER BY sequence_number DESC LIMIT 1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find latest version", e))
    }

    async fn list(&self, file_id: FileId, page: &PageRequest) -> AppResult<PageResponse<Version>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM file_versions WHERE file_id = $1")
                .bind(file_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count versions", e))?;

        let versions = sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE file_id = $1 \
             ORDER BY sequence_number DESC LIMIT $2 OFFSET $3",
        )
        .bind(file_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list versions", e))?;

        Ok(PageResponse::new(versions, page, total as u64))
    }

    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM file_versions WHERE file_id = $1 ORDER BY sequence_number",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list versions", e))
    }
}
