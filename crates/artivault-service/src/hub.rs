//! Policy-enforcing facade over the Artivault services.
//!
//! Every context-bound method first asks the [`AccessEvaluator`] whether the
//! acting user holds the level the operation needs and fails with
//! `Forbidden` (or `NotFound` for a missing or deleted file) before touching
//! anything. Share link entry points are anonymous: the token is the
//! credential.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use artivault_core::config::AppConfig;
use artivault_core::result::AppResult;
use artivault_core::traits::StorageProvider;
use artivault_core::types::{FileId, PageRequest, PageResponse, ShareId, UserId, VersionId};
use artivault_database::Repositories;
use artivault_entity::file::{File, Visibility};
use artivault_entity::permission::{Permission, PermissionLevel, PermissionPatch, PermissionStats};
use artivault_entity::share::{ShareLink, ShareLinkPatch, ShareStats};
use artivault_entity::version::{Rollback, Version, VersionStats};

use crate::access::{AccessEvaluator, FileAccess};
use crate::content::{ContentUpload, ContentWriter};
use crate::context::RequestContext;
use crate::file::FileService;
use crate::permission::PermissionService;
use crate::share::{CreateShareRequest, ShareService};
use crate::version::VersionService;

/// Content fetched through a share link.
#[derive(Debug, Clone, Serialize)]
pub struct SharedDownload {
    /// The link after its counter was bumped.
    pub link: ShareLink,
    /// The shared file.
    pub file: File,
    /// Content of the file's current version.
    #[serde(skip)]
    pub data: Bytes,
}

/// Entry point for the request layer.
///
/// All fields are `Arc`-wrapped or cheaply cloneable.
#[derive(Debug, Clone)]
pub struct ArtifactHub {
    /// Storage provider shared by all services.
    storage: Arc<dyn StorageProvider>,
    /// Access evaluator.
    access: Arc<AccessEvaluator>,
    /// File lifecycle.
    files: Arc<FileService>,
    /// Permission grants.
    permissions: Arc<PermissionService>,
    /// Share links.
    shares: Arc<ShareService>,
    /// Version history.
    versions: Arc<VersionService>,
}

impl ArtifactHub {
    /// Wire the services over the given repositories and storage.
    pub fn new(repos: Repositories, storage: Arc<dyn StorageProvider>, config: &AppConfig) -> Self {
        let writer = ContentWriter::new(storage.clone(), config.storage.max_content_size_bytes);
        let versions = VersionService::new(
            repos.files.clone(),
            repos.versions.clone(),
            writer.clone(),
            config.versioning.max_change_note_chars,
        );
        let files = FileService::new(repos.files.clone(), versions.clone(), writer);
        let access = AccessEvaluator::new(repos.files.clone(), repos.permissions.clone());
        let permissions = PermissionService::new(repos.files.clone(), repos.permissions);
        let shares = ShareService::new(repos.files, repos.shares, config.sharing.base_url.clone());

        Self {
            storage,
            access: Arc::new(access),
            files: Arc::new(files),
            permissions: Arc::new(permissions),
            shares: Arc::new(shares),
            versions: Arc::new(versions),
        }
    }

    /// A hub over the in-memory database and storage with default settings.
    pub fn in_memory() -> Self {
        Self::new(
            Repositories::memory(),
            Arc::new(artivault_storage::MemoryStorageProvider::new()),
            &AppConfig::default(),
        )
    }

    /// Build the backends named in configuration and wire the hub.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let repos = Repositories::from_config(&config.database).await?;
        let storage = artivault_storage::build_provider(&config.storage).await?;
        info!(
            database = %config.database.provider,
            storage = storage.provider_type(),
            "Artifact hub ready"
        );
        Ok(Self::new(repos, storage, config))
    }

    /// The content storage provider.
    pub fn storage(&self) -> &Arc<dyn StorageProvider> {
        &self.storage
    }

    /// The access evaluator.
    pub fn access(&self) -> &AccessEvaluator {
        &self.access
    }

    /// The share service, for URL building.
    pub fn shares(&self) -> &ShareService {
        &self.shares
    }

    // ── Access ───────────────────────────────────────────────

    /// Whether `user_id` holds at least `level` on the file.
    pub async fn check_access(
        &self,
        file_id: FileId,
        user_id: UserId,
        level: PermissionLevel,
    ) -> AppResult<bool> {
        self.access.check_access(file_id, user_id, level).await
    }

    /// What the acting user may do with a file.
    pub async fn describe_access(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<FileAccess> {
        self.access.describe(file_id, ctx.user_id).await
    }

    // ── Files ────────────────────────────────────────────────

    /// Upload a new file owned by the acting user.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        name: &str,
        upload: &ContentUpload,
        visibility: Visibility,
    ) -> AppResult<(File, Version)> {
        self.files.upload(ctx.user_id, name, upload, visibility).await
    }

    /// Get a file. Requires READ.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Read).await
    }

    /// Download a file's current content. Requires READ.
    pub async fn read_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<(File, Bytes)> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Read).await?;
        self.files.read_current(file_id).await
    }

    /// Files owned by the acting user.
    pub async fn list_my_files(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>> {
        self.files.list_by_owner(ctx.user_id, page).await
    }

    /// Change a file's visibility. Requires ADMIN.
    pub async fn set_visibility(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        visibility: Visibility,
    ) -> AppResult<File> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Admin).await?;
        self.files.set_visibility(file_id, visibility).await
    }

    /// Soft-delete a file. Requires ADMIN.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Admin).await?;
        self.files.delete(file_id).await
    }

    // ── Permissions ──────────────────────────────────────────

    /// Grant a level on a file. Requires ADMIN.
    pub async fn grant_permission(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        grantee_id: UserId,
        level: PermissionLevel,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<Permission> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Admin).await?;
        self.permissions
            .grant(file_id, grantee_id, level, ctx.user_id, expires_at)
            .await
    }

    /// Revoke a user's grant. Requires ADMIN.
    pub async fn revoke_permission(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        grantee_id: UserId,
    ) -> AppResult<Permission> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Admin).await?;
        self.permissions.revoke(file_id, grantee_id).await
    }

    /// Partially update a grant. Requires ADMIN.
    pub async fn update_permission(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        grantee_id: UserId,
        patch: &PermissionPatch,
    ) -> AppResult<Permission> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Admin).await?;
        self.permissions.update(file_id, grantee_id, patch).await
    }

    /// List a file's grants. Requires ADMIN.
    pub async fn list_permissions(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Permission>> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Admin).await?;
        self.permissions.list(file_id, page).await
    }

    /// Grant counts for a file. Requires ADMIN.
    pub async fn permission_stats(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
    ) -> AppResult<PermissionStats> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Admin).await?;
        self.permissions.stats(file_id).await
    }

    // ── Share links ──────────────────────────────────────────

    /// Create a share link. Requires WRITE.
    pub async fn create_share(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        req: &CreateShareRequest,
    ) -> AppResult<ShareLink> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Write).await?;
        self.shares.create(file_id, ctx.user_id, req).await
    }

    /// List a file's links. Requires WRITE.
    pub async fn list_shares(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLink>> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Write).await?;
        self.shares.list(file_id, page).await
    }

    /// Link counts for a file. Requires WRITE.
    pub async fn share_stats(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<ShareStats> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Write).await?;
        self.shares.stats(file_id).await
    }

    /// Load a link the acting user may manage.
    ///
    /// The creator still needs WRITE on the file; anyone else needs ADMIN.
    async fn managed_share(&self, ctx: &RequestContext, share_id: ShareId) -> AppResult<ShareLink> {
        let link = self.shares.get(share_id).await?;
        let required = if link.created_by == ctx.user_id {
            PermissionLevel::Write
        } else {
            PermissionLevel::Admin
        };
        self.access.require(link.file_id, ctx.user_id, required).await?;
        Ok(link)
    }

    /// Revoke a link. Allowed for its creator while they hold WRITE, or a file ADMIN.
    pub async fn revoke_share(&self, ctx: &RequestContext, share_id: ShareId) -> AppResult<ShareLink> {
        self.managed_share(ctx, share_id).await?;
        self.shares.delete(share_id).await
    }

    /// Update a link. Allowed for its creator while they hold WRITE, or a file ADMIN.
    pub async fn update_share(
        &self,
        ctx: &RequestContext,
        share_id: ShareId,
        patch: &ShareLinkPatch,
    ) -> AppResult<ShareLink> {
        self.managed_share(ctx, share_id).await?;
        self.shares.update(share_id, patch).await
    }

    /// Look up a link by token without counting a download.
    pub async fn resolve_share(&self, token: &str) -> AppResult<ShareLink> {
        self.shares.resolve(token).await
    }

    /// Count one download on a link.
    pub async fn record_download(&self, share_id: ShareId) -> AppResult<bool> {
        self.shares.record_download(share_id).await
    }

    /// Validate a token and count a download.
    pub async fn open_share(&self, token: &str) -> AppResult<ShareLink> {
        self.shares.open(token).await
    }

    /// Validate a token, count a download, and return the current content.
    pub async fn download_shared(&self, token: &str) -> AppResult<SharedDownload> {
        let link = self.shares.open(token).await?;
        let (file, data) = self.files.read_current(link.file_id).await?;
        info!(
            share_id = %link.id,
            file_id = %file.id,
            download_count = link.download_count,
            "Shared file downloaded"
        );
        Ok(SharedDownload { link, file, data })
    }

    // ── Versions ─────────────────────────────────────────────

    /// Add a version and make it current. Requires WRITE.
    pub async fn create_version(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        upload: &ContentUpload,
        change_note: Option<&str>,
    ) -> AppResult<Version> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Write).await?;
        self.versions
            .create_version(file_id, upload, change_note, ctx.user_id)
            .await
    }

    /// Make an earlier version current. Requires WRITE.
    pub async fn rollback_version(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        version_id: VersionId,
    ) -> AppResult<Rollback> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Write).await?;
        self.versions.rollback(file_id, version_id).await
    }

    /// Delete a non-current version. Requires ADMIN on its file.
    pub async fn delete_version(&self, ctx: &RequestContext, version_id: VersionId) -> AppResult<Version> {
        let version = self.versions.get(version_id).await?;
        self.access
            .require(version.file_id, ctx.user_id, PermissionLevel::Admin)
            .await?;
        self.versions.delete(version_id).await
    }

    /// List a file's versions, newest first. Requires READ.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Version>> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Read).await?;
        self.versions.list(file_id, page).await
    }

    /// Version history summary. Requires READ.
    pub async fn version_stats(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<VersionStats> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Read).await?;
        self.versions.stats(file_id).await
    }

    /// Label the next version would get. Requires READ.
    pub async fn next_version_label(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<String> {
        self.access.require(file_id, ctx.user_id, PermissionLevel::Read).await?;
        self.versions.next_version_label(file_id).await
    }

    /// Get a version and its content. Requires READ on its file.
    pub async fn read_version(
        &self,
        ctx: &RequestContext,
        version_id: VersionId,
    ) -> AppResult<(Version, Bytes)> {
        let version = self.versions.get(version_id).await?;
        self.access
            .require(version.file_id, ctx.user_id, PermissionLevel::Read)
            .await?;
        let data = self.versions.read_content(&version).await?;
        Ok((version, data))
    }
}
