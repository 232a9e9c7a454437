//! Share link repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, ShareId};
use artivault_entity::share::{NewShareLink, ShareLink, ShareLinkPatch};

/// Storage of share links.
#[async_trait]
pub trait ShareRepository: Send + Sync + 'static {
    /// Insert a new link with a zero download counter.
    async fn create(&self, data: &NewShareLink) -> AppResult<ShareLink>;

    /// Find a link by ID in any status.
    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<ShareLink>>;

    /// Find a link by token in any status.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>>;

    /// Apply a partial update. `None` if absent.
    async fn update(&self, id: ShareId, patch: &ShareLinkPatch) -> AppResult<Option<ShareLink>>;

    /// Increment the download counter if, and only if, the link is valid at
    /// `now`.
    ///
    /// The validity check and the increment are one atomic step. Returns the
    /// updated link, or `None` if the link is absent or not valid.
    async fn try_record_download(
        &self,
        id: ShareId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareLink>>;

    /// List a file's links, newest first.
    async fn list(&self, file_id: FileId, page: &PageRequest)
    -> AppResult<PageResponse<ShareLink>>;

    /// All of a file's links.
    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<ShareLink>>;
}
