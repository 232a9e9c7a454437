//! Permission grants: grant, update, revoke, list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, UserId};
use artivault_database::repositories::{FileRepository, PermissionRepository};
use artivault_entity::file::File;
use artivault_entity::permission::{
    NewPermission, Permission, PermissionLevel, PermissionPatch, PermissionStats,
};

/// Manages explicit grants on files.
///
/// Callers are expected to have checked ADMIN access on the file first.
#[derive(Clone)]
pub struct PermissionService {
    /// File repository.
    files: Arc<dyn FileRepository>,
    /// Permission repository.
    permissions: Arc<dyn PermissionRepository>,
}

impl std::fmt::Debug for PermissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionService").finish()
    }
}

fn ensure_future(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> AppResult<()> {
    match expires_at {
        Some(at) if at <= now => Err(AppError::validation(
            "Expiration date must be in the future",
        )),
        _ => Ok(()),
    }
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        permissions: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self { files, permissions }
    }

    async fn active_file(&self, file_id: FileId) -> AppResult<File> {
        self.files
            .find_by_id(file_id)
            .await?
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Grant `level` on a file to a user, replacing any existing grant.
    ///
    /// A revoked row is reactivated; its ID and creation time are kept.
    pub async fn grant(
        &self,
        file_id: FileId,
        grantee_id: UserId,
        level: PermissionLevel,
        granted_by: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<Permission> {
        ensure_future(expires_at, Utc::now())?;
        self.active_file(file_id).await?;

        let permission = self
            .permissions
            .upsert(&NewPermission {
                file_id,
                grantee_id,
                level,
                granted_by,
                expires_at,
            })
            .await?;

        info!(
            file_id = %file_id,
            user_id = %granted_by,
            grantee_id = %grantee_id,
            level = %level,
            "Permission granted"
        );
        Ok(permission)
    }

    /// Revoke a user's grant on a file. The row is kept with status revoked.
    pub async fn revoke(&self, file_id: FileId, grantee_id: UserId) -> AppResult<Permission> {
        if let Some(revoked) = self.permissions.revoke(file_id, grantee_id).await? {
            info!(file_id = %file_id, grantee_id = %grantee_id, "Permission revoked");
            return Ok(revoked);
        }
        // Nothing flipped: the row is either missing or already revoked.
        self.get(file_id, grantee_id).await?;
        Err(AppError::invalid_state(format!(
            "Permission for user {grantee_id} on file {file_id} is already revoked"
        )))
    }

    /// Partially update a grant.
    pub async fn update(
        &self,
        file_id: FileId,
        grantee_id: UserId,
        patch: &PermissionPatch,
    ) -> AppResult<Permission> {
        if patch.is_empty() {
            return Err(AppError::validation("Permission update changes nothing"));
        }
        if let Some(expires_at) = patch.expires_at {
            ensure_future(expires_at, Utc::now())?;
        }
        let permission = self
            .permissions
            .update(file_id, grantee_id, patch)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No permission for user {grantee_id} on file {file_id}"
                ))
            })?;

        info!(
            file_id = %file_id,
            grantee_id = %grantee_id,
            level = %permission.level,
            status = %permission.status,
            "Permission updated"
        );
        Ok(permission)
    }

    /// Get a user's grant on a file in any status.
    pub async fn get(&self, file_id: FileId, grantee_id: UserId) -> AppResult<Permission> {
        self.permissions
            .find(file_id, grantee_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No permission for user {grantee_id} on file {file_id}"
                ))
            })
    }

    /// List a file's grants, newest first.
    pub async fn list(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Permission>> {
        self.active_file(file_id).await?;
        self.permissions.list(file_id, page).await
    }

    /// Count a file's grants by state and level.
    pub async fn stats(&self, file_id: FileId) -> AppResult<PermissionStats> {
        self.active_file(file_id).await?;
        let rows = self.permissions.find_all(file_id).await?;
        Ok(PermissionStats::from_rows(&rows, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artivault_core::ErrorKind;
    use artivault_database::Repositories;
    use artivault_entity::file::{ContentDescriptor, NewFile, Visibility};
    use artivault_entity::permission::PermissionStatus;
    use chrono::Duration;

    async fn setup() -> (Repositories, PermissionService, File) {
        let repos = Repositories::memory();
        let (file, _) = repos
            .versions
            .insert_initial(
                &NewFile {
                    id: FileId::new(),
                    owner_id: UserId::new(),
                    name: "doc.txt".to_string(),
                    visibility: Visibility::Private,
                    content: ContentDescriptor {
                        storage_key: "k".to_string(),
                        size_bytes: 1,
                        mime_type: "text/plain".to_string(),
                        original_name: "doc.txt".to_string(),
                        checksum_sha256: String::new(),
                    },
                },
                None,
            )
            .await
            .expect("file");
        let service = PermissionService::new(repos.files.clone(), repos.permissions.clone());
        (repos, service, file)
    }

    #[tokio::test]
    async fn test_regrant_updates_single_row() {
        let (_repos, service, file) = setup().await;
        let user = UserId::new();
        let first = service
            .grant(file.id, user, PermissionLevel::Read, file.owner_id, None)
            .await
            .expect("grant");
        let second = service
            .grant(file.id, user, PermissionLevel::Write, file.owner_id, None)
            .await
            .expect("regrant");

        assert_eq!(first.id, second.id);
        let page = service.list(file.id, &PageRequest::default()).await.expect("list");
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].level, PermissionLevel::Write);
        assert_eq!(page.items[0].status, PermissionStatus::Active);
    }

    #[tokio::test]
    async fn test_grant_rejects_past_expiry() {
        let (_repos, service, file) = setup().await;
        let past = Utc::now() - Duration::minutes(1);
        let err = service
            .grant(file.id, UserId::new(), PermissionLevel::Read, file.owner_id, Some(past))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(service.stats(file.id).await.expect("stats").total, 0);
    }

    #[tokio::test]
    async fn test_grant_on_missing_or_deleted_file() {
        let (repos, service, file) = setup().await;
        let err = service
            .grant(FileId::new(), UserId::new(), PermissionLevel::Read, file.owner_id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        repos.files.soft_delete(file.id).await.expect("delete");
        let err = service
            .grant(file.id, UserId::new(), PermissionLevel::Read, file.owner_id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_revoke_keeps_row() {
        let (_repos, service, file) = setup().await;
        let user = UserId::new();
        service
            .grant(file.id, user, PermissionLevel::Admin, file.owner_id, None)
            .await
            .expect("grant");

        let revoked = service.revoke(file.id, user).await.expect("revoke");
        assert_eq!(revoked.status, PermissionStatus::Revoked);
        assert_eq!(
            service.get(file.id, user).await.expect("get").status,
            PermissionStatus::Revoked
        );

        let again = service.revoke(file.id, user).await.unwrap_err();
        assert_eq!(again.kind, ErrorKind::InvalidState);
        let missing = service.revoke(file.id, UserId::new()).await.unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_patch() {
        let (_repos, service, file) = setup().await;
        let user = UserId::new();
        service
            .grant(
                file.id,
                user,
                PermissionLevel::Read,
                file.owner_id,
                Some(Utc::now() + Duration::days(1)),
            )
            .await
            .expect("grant");

        let updated = service
            .update(
                file.id,
                user,
                &PermissionPatch {
                    level: Some(PermissionLevel::Admin),
                    expires_at: Some(None),
                    status: None,
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.level, PermissionLevel::Admin);
        assert!(updated.expires_at.is_none());

        let bad = PermissionPatch {
            expires_at: Some(Some(Utc::now() - Duration::seconds(5))),
            ..PermissionPatch::default()
        };
        assert_eq!(
            service.update(file.id, user, &bad).await.unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            service
                .update(file.id, user, &PermissionPatch::default())
                .await
                .unwrap_err()
                .kind,
            ErrorKind::Validation
        );
        let demote = PermissionPatch {
            level: Some(PermissionLevel::Read),
            ..PermissionPatch::default()
        };
        assert_eq!(
            service.update(file.id, UserId::new(), &demote).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_grants_leave_one_row() {
        let (_repos, service, file) = setup().await;
        let user = UserId::new();
        let tasks: Vec<_> = PermissionLevel::ALL
            .into_iter()
            .cycle()
            .take(12)
            .map(|level| {
                let service = service.clone();
                let owner = file.owner_id;
                let file_id = file.id;
                tokio::spawn(async move { service.grant(file_id, user, level, owner, None).await })
            })
            .collect();
        for task in futures::future::join_all(tasks).await {
            task.expect("join").expect("grant");
        }

        let stats = service.stats(file.id).await.expect("stats");
        assert_eq!(stats.total, 1);
        assert_eq!(stats.active, 1);
    }
}
