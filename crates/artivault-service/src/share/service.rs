//! Share link lifecycle and download accounting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, ShareId, UserId};
use artivault_database::repositories::{FileRepository, ShareRepository};
use artivault_entity::file::File;
use artivault_entity::share::{
    NewShareLink, ShareLevel, ShareLink, ShareLinkPatch, ShareStats, ShareStatus, ShareValidity,
};

use super::link::{generate_token, share_url};

/// Request to create a share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareRequest {
    /// Level conferred on the bearer.
    pub level: ShareLevel,
    /// Maximum downloads (None = unlimited).
    pub max_downloads: Option<i32>,
    /// Expiration time (None = never).
    pub expires_at: Option<DateTime<Utc>>,
}

impl Default for CreateShareRequest {
    fn default() -> Self {
        Self {
            level: ShareLevel::Read,
            max_downloads: None,
            expires_at: None,
        }
    }
}

/// Issues, validates, and revokes share links.
#[derive(Clone)]
pub struct ShareService {
    /// File repository.
    files: Arc<dyn FileRepository>,
    /// Share repository.
    shares: Arc<dyn ShareRepository>,
    /// Public base URL for links.
    base_url: String,
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn validate_limits(
    max_downloads: Option<i32>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if max_downloads.is_some_and(|max| max < 1) {
        return Err(AppError::validation("max_downloads must be at least 1"));
    }
    if expires_at.is_some_and(|at| at <= now) {
        return Err(AppError::validation("Expiration date must be in the future"));
    }
    Ok(())
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        shares: Arc<dyn ShareRepository>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            files,
            shares,
            base_url: base_url.into(),
        }
    }

    async fn active_file(&self, file_id: FileId) -> AppResult<File> {
        self.files
            .find_by_id(file_id)
            .await?
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Create a link on a file. Callers check WRITE access first.
    pub async fn create(
        &self,
        file_id: FileId,
        created_by: UserId,
        req: &CreateShareRequest,
    ) -> AppResult<ShareLink> {
        validate_limits(req.max_downloads, req.expires_at, Utc::now())?;
        self.active_file(file_id).await?;

        let link = self
            .shares
            .create(&NewShareLink {
                file_id,
                token: generate_token(),
                created_by,
                level: req.level,
                max_downloads: req.max_downloads,
                expires_at: req.expires_at,
            })
            .await?;

        info!(
            user_id = %created_by,
            file_id = %file_id,
            share_id = %link.id,
            level = %link.level,
            max_downloads = ?link.max_downloads,
            "Share link created"
        );
        Ok(link)
    }

    /// Look up a link by token, whatever its validity.
    pub async fn resolve(&self, token: &str) -> AppResult<ShareLink> {
        self.shares
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Share link not found"))
    }

    /// Look up a link by ID, whatever its validity.
    pub async fn get(&self, share_id: ShareId) -> AppResult<ShareLink> {
        self.shares
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share link {share_id} not found")))
    }

    /// Validity of a link right now.
    pub fn validity(&self, link: &ShareLink) -> ShareValidity {
        link.validity(Utc::now())
    }

    /// Whether a link is usable right now.
    pub fn is_valid(&self, link: &ShareLink) -> bool {
        self.validity(link).is_valid()
    }

    /// Turn an unusable link into the matching error.
    ///
    /// Revoked links look the same as unknown ones to the bearer.
    pub fn ensure_valid(&self, link: &ShareLink) -> AppResult<()> {
        match self.validity(link) {
            ShareValidity::Valid => Ok(()),
            ShareValidity::Revoked => Err(AppError::not_found("Share link not found")),
            ShareValidity::Expired => Err(AppError::expired("Share link has expired")),
            ShareValidity::LimitReached => {
                Err(AppError::limit_reached("Share link download limit reached"))
            }
        }
    }

    /// Count one download if the link is still valid.
    ///
    /// Returns `false` without changing anything when the link is revoked,
    /// expired, or out of downloads. Concurrent calls never push the counter
    /// past `max_downloads`.
    pub async fn record_download(&self, share_id: ShareId) -> AppResult<bool> {
        let now = Utc::now();
        if let Some(link) = self.shares.try_record_download(share_id, now).await? {
            debug!(
                share_id = %share_id,
                download_count = link.download_count,
                "Share download recorded"
            );
            return Ok(true);
        }
        let link = self.get(share_id).await?;
        warn!(
            share_id = %share_id,
            validity = %link.validity(now),
            "Share download denied"
        );
        Ok(false)
    }

    /// Resolve, validate, and count a download in one go.
    ///
    /// Returns the link with its updated counter.
    pub async fn open(&self, token: &str) -> AppResult<ShareLink> {
        let link = self.resolve(token).await?;
        self.ensure_valid(&link)?;
        self.active_file(link.file_id).await?;

        if !self.record_download(link.id).await? {
            // Lost a race for the last download, or expired meanwhile.
            let latest = self.get(link.id).await?;
            self.ensure_valid(&latest)?;
            return Err(AppError::limit_reached("Share link download limit reached"));
        }
        self.get(link.id).await
    }

    /// Partially update a link.
    pub async fn update(&self, share_id: ShareId, patch: &ShareLinkPatch) -> AppResult<ShareLink> {
        if patch.is_empty() {
            return Err(AppError::validation("Share link update changes nothing"));
        }
        validate_limits(
            patch.max_downloads.flatten(),
            patch.expires_at.flatten(),
            Utc::now(),
        )?;
        let link = self
            .shares
            .update(share_id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share link {share_id} not found")))?;

        info!(
            share_id = %share_id,
            status = %link.status,
            "Share link updated"
        );
        Ok(link)
    }

    /// Revoke a link. The row is kept.
    pub async fn delete(&self, share_id: ShareId) -> AppResult<ShareLink> {
        let patch = ShareLinkPatch {
            status: Some(ShareStatus::Revoked),
            ..ShareLinkPatch::default()
        };
        let link = self
            .shares
            .update(share_id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share link {share_id} not found")))?;
        info!(share_id = %share_id, file_id = %link.file_id, "Share link revoked");
        Ok(link)
    }

    /// List a file's links, newest first.
    pub async fn list(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLink>> {
        self.active_file(file_id).await?;
        self.shares.list(file_id, page).await
    }

    /// Count a file's links by validity.
    pub async fn stats(&self, file_id: FileId) -> AppResult<ShareStats> {
        self.active_file(file_id).await?;
        let links = self.shares.find_all(file_id).await?;
        Ok(ShareStats::from_links(&links, Utc::now()))
    }

    /// Public URL of a link.
    pub fn share_url(&self, link: &ShareLink) -> String {
        share_url(&self.base_url, &link.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artivault_core::ErrorKind;
    use artivault_database::Repositories;
    use artivault_entity::file::{ContentDescriptor, NewFile, Visibility};
    use chrono::Duration;

    async fn setup() -> (ShareService, File) {
        let repos = Repositories::memory();
        let (file, _) = repos
            .versions
            .insert_initial(
                &NewFile {
                    id: FileId::new(),
                    owner_id: UserId::new(),
                    name: "deck.pdf".to_string(),
                    visibility: Visibility::Private,
                    content: ContentDescriptor {
                        storage_key: "k".to_string(),
                        size_bytes: 1,
                        mime_type: "application/pdf".to_string(),
                        original_name: "deck.pdf".to_string(),
                        checksum_sha256: String::new(),
                    },
                },
                None,
            )
            .await
            .expect("file");
        let service = ShareService::new(repos.files, repos.shares, "https://files.example/s");
        (service, file)
    }

    fn limited(max: i32) -> CreateShareRequest {
        CreateShareRequest {
            max_downloads: Some(max),
            ..CreateShareRequest::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let (service, file) = setup().await;
        let link = service
            .create(file.id, file.owner_id, &CreateShareRequest::default())
            .await
            .expect("create");
        assert_eq!(link.download_count, 0);
        assert_eq!(link.token.len(), 43);
        assert!(service.is_valid(&link));

        let resolved = service.resolve(&link.token).await.expect("resolve");
        assert_eq!(resolved.id, link.id);
        assert_eq!(
            service.share_url(&link),
            format!("https://files.example/s/{}", link.token)
        );
        assert!(service.resolve("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (service, file) = setup().await;
        let zero = service.create(file.id, file.owner_id, &limited(0)).await;
        assert_eq!(zero.unwrap_err().kind, ErrorKind::Validation);

        let past = CreateShareRequest {
            expires_at: Some(Utc::now() - Duration::hours(1)),
            ..CreateShareRequest::default()
        };
        let err = service.create(file.id, file.owner_id, &past).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let missing = service
            .create(FileId::new(), file.owner_id, &CreateShareRequest::default())
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_quota_stops_fourth_download() {
        let (service, file) = setup().await;
        let link = service.create(file.id, file.owner_id, &limited(3)).await.expect("create");
        for _ in 0..3 {
            assert!(service.record_download(link.id).await.expect("record"));
        }
        assert!(!service.record_download(link.id).await.expect("record"));

        let link = service.get(link.id).await.expect("get");
        assert_eq!(link.download_count, 3);
        assert_eq!(service.validity(&link), ShareValidity::LimitReached);
        assert_eq!(
            service.ensure_valid(&link).unwrap_err().kind,
            ErrorKind::LimitReached
        );
    }

    #[tokio::test]
    async fn test_record_download_unknown_id() {
        let (service, _file) = setup().await;
        let err = service.record_download(ShareId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_revoked_link_cannot_download() {
        let (service, file) = setup().await;
        let link = service
            .create(file.id, file.owner_id, &CreateShareRequest::default())
            .await
            .expect("create");
        let revoked = service.delete(link.id).await.expect("delete");
        assert_eq!(revoked.status, ShareStatus::Revoked);
        assert!(!service.record_download(link.id).await.expect("record"));
        assert!(service.open(&link.token).await.unwrap_err().is_not_found());
        // Still resolvable for audit.
        assert!(service.resolve(&link.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_link() {
        let (service, file) = setup().await;
        let link = service
            .create(file.id, file.owner_id, &CreateShareRequest::default())
            .await
            .expect("create");
        let err = service
            .update(
                link.id,
                &ShareLinkPatch {
                    expires_at: Some(Some(Utc::now() - Duration::seconds(1))),
                    ..ShareLinkPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = service.update(link.id, &ShareLinkPatch::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let mut expired = service.get(link.id).await.expect("get");
        expired.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert_eq!(service.ensure_valid(&expired).unwrap_err().kind, ErrorKind::Expired);
    }

    #[tokio::test]
    async fn test_open_counts_download() {
        let (service, file) = setup().await;
        let link = service.create(file.id, file.owner_id, &limited(1)).await.expect("create");
        let opened = service.open(&link.token).await.expect("open");
        assert_eq!(opened.download_count, 1);
        assert!(opened.last_accessed_at.is_some());
        let err = service.open(&link.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::LimitReached);
    }

    #[tokio::test]
    async fn test_list_and_stats() {
        let (service, file) = setup().await;
        let a = service.create(file.id, file.owner_id, &limited(1)).await.expect("a");
        let b = service
            .create(file.id, file.owner_id, &CreateShareRequest::default())
            .await
            .expect("b");
        service.record_download(a.id).await.expect("record");
        service.record_download(b.id).await.expect("record");

        let page = service.list(file.id, &PageRequest::default()).await.expect("list");
        assert_eq!(page.total_items, 2);

        let stats = service.stats(file.id).await.expect("stats");
        assert_eq!(stats.active, 1);
        assert_eq!(stats.exhausted, 1);
        assert_eq!(stats.total_downloads, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_downloads_respect_quota() {
        let (service, file) = setup().await;
        let link = service.create(file.id, file.owner_id, &limited(3)).await.expect("create");

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let service = service.clone();
                let id = link.id;
                tokio::spawn(async move { service.record_download(id).await })
            })
            .collect();
        let granted = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.expect("join").expect("record"))
            .filter(|ok| *ok)
            .count();

        assert_eq!(granted, 3);
        assert_eq!(service.get(link.id).await.expect("get").download_count, 3);
    }
}
