//! Resolves what a user may do with a file.
//!
//! A user's effective level on a file is the highest of:
//! - ADMIN, if they own it;
//! - the level of their grant, if it is active and not expired;
//! - READ, if the file is public.
//!
//! Deleted or missing files grant nothing to anyone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::types::{FileId, UserId};
use artivault_database::repositories::{FileRepository, PermissionRepository};
use artivault_entity::file::File;
use artivault_entity::permission::{Permission, PermissionLevel};

/// Summary of one user's capabilities on one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAccess {
    /// The file.
    pub file_id: FileId,
    /// The user.
    pub user_id: UserId,
    /// Whether the user owns the file.
    pub is_owner: bool,
    /// Effective level, if any.
    pub level: Option<PermissionLevel>,
    /// May view and download.
    pub can_read: bool,
    /// May upload versions and roll back.
    pub can_write: bool,
    /// May create share links.
    pub can_share: bool,
    /// May delete the file or its versions.
    pub can_delete: bool,
    /// May grant and revoke permissions.
    pub can_manage_permissions: bool,
}

impl FileAccess {
    fn new(file_id: FileId, user_id: UserId, is_owner: bool, level: Option<PermissionLevel>) -> Self {
        let at_least = |required: PermissionLevel| level.is_some_and(|l| l.has_at_least(required));
        Self {
            file_id,
            user_id,
            is_owner,
            level,
            can_read: at_least(PermissionLevel::Read),
            can_write: at_least(PermissionLevel::Write),
            can_share: at_least(PermissionLevel::Write),
            can_delete: at_least(PermissionLevel::Admin),
            can_manage_permissions: at_least(PermissionLevel::Admin),
        }
    }
}

/// Compute a user's effective level from an already loaded file and grant.
///
/// `permission` must be the grantee row for `(file.id, user_id)` if one
/// exists; it is ignored when revoked or expired at `now`.
pub fn effective_level(
    file: &File,
    permission: Option<&Permission>,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Option<PermissionLevel> {
    if file.is_deleted() {
        return None;
    }
    if file.owner_id == user_id {
        return Some(PermissionLevel::Admin);
    }
    let granted = permission
        .filter(|p| p.file_id == file.id && p.grantee_id == user_id && p.is_valid(now))
        .map(|p| p.level);
    let public = file.is_public().then_some(PermissionLevel::Read);
    granted.max(public)
}

/// Answers access questions against the repositories. Has no side effects.
#[derive(Clone)]
pub struct AccessEvaluator {
    /// File repository.
    files: Arc<dyn FileRepository>,
    /// Permission repository.
    permissions: Arc<dyn PermissionRepository>,
}

impl std::fmt::Debug for AccessEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessEvaluator").finish()
    }
}

impl AccessEvaluator {
    /// Creates a new access evaluator.
    pub fn new(
        files: Arc<dyn FileRepository>,
        permissions: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self { files, permissions }
    }

    async fn load(&self, file_id: FileId, user_id: UserId) -> AppResult<Option<(File, Option<PermissionLevel>)>> {
        let Some(file) = self.files.find_by_id(file_id).await? else {
            return Ok(None);
        };
        if file.is_deleted() {
            return Ok(None);
        }
        // Owners already hold ADMIN.
        let permission = if file.owner_id == user_id {
            None
        } else {
            self.permissions.find(file_id, user_id).await?
        };
        let level = effective_level(&file, permission.as_ref(), user_id, Utc::now());
        Ok(Some((file, level)))
    }

    /// The user's effective level on the file, or `None` if they have no
    /// access or the file is missing or deleted.
    pub async fn effective_level(
        &self,
        file_id: FileId,
        user_id: UserId,
    ) -> AppResult<Option<PermissionLevel>> {
        Ok(self.load(file_id, user_id).await?.and_then(|(_, level)| level))
    }

    /// Whether the user holds at least `required` on the file.
    pub async fn check_access(
        &self,
        file_id: FileId,
        user_id: UserId,
        required: PermissionLevel,
    ) -> AppResult<bool> {
        let allowed = self
            .effective_level(file_id, user_id)
            .await?
            .is_some_and(|level| level.has_at_least(required));
        debug!(
            file_id = %file_id,
            user_id = %user_id,
            required = %required,
            allowed,
            "Access checked"
        );
        Ok(allowed)
    }

    /// Like [`check_access`](Self::check_access) but returns the file, or
    /// `NotFound` for a missing or deleted file and `Forbidden` otherwise.
    pub async fn require(
        &self,
        file_id: FileId,
        user_id: UserId,
        required: PermissionLevel,
    ) -> AppResult<File> {
        let (file, level) = self
            .load(file_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        if level.is_some_and(|l| l.has_at_least(required)) {
            Ok(file)
        } else {
            Err(AppError::forbidden(format!(
                "{required} access to file {file_id} is required"
            )))
        }
    }

    /// Summarise the user's capabilities on the file.
    pub async fn describe(&self, file_id: FileId, user_id: UserId) -> AppResult<FileAccess> {
        let (file, level) = self
            .load(file_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        Ok(FileAccess::new(
            file_id,
            user_id,
            file.owner_id == user_id,
            level,
        ))
    }
}
