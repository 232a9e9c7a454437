use async_trait::async_trait;
use chrono::{DateTime, Utc};

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, ShareId};
use artivault_entity::share::{NewShareLink, ShareLink, ShareLinkPatch, ShareStatus};

use super::{MemoryStore, newest_first};
use crate::repositories::ShareRepository;

#[async_trait]
impl ShareRepository for MemoryStore {
    async fn create(&self, data: &NewShareLink) -> AppResult<ShareLink> {
        let mut state = self.state.lock().await;
        if state.share_tokens.contains_key(&data.token) {
            return Err(AppError::conflict("Share token already exists"));
        }
        let now = Utc::now();
        let link = ShareLink {
            id: ShareId::new(),
            file_id: data.file_id,
            token: data.token.clone(),
            created_by: data.created_by,
            level: data.level,
            max_downloads: data.max_downloads,
            download_count: 0,
            expires_at: data.expires_at,
            status: ShareStatus::Active,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
        };
        state.share_tokens.insert(link.token.clone(), link.id);
        state.shares.insert(link.id, link.clone());
        Ok(link)
    }

    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<ShareLink>> {
        let state = self.state.lock().await;
        Ok(state.shares.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        let state = self.state.lock().await;
        Ok(state
            .share_tokens
            .get(token)
            .and_then(|id| state.shares.get(id))
            .cloned())
    }

    async fn update(&self, id: ShareId, patch: &ShareLinkPatch) -> AppResult<Option<ShareLink>> {
        let mut state = self.state.lock().await;
        Ok(state.shares.get_mut(&id).map(|link| {
            patch.apply(link);
            link.updated_at = Utc::now();
            link.clone()
        }))
    }

    async fn try_record_download(
        &self,
        id: ShareId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareLink>> {
        let mut state = self.state.lock().await;
        Ok(state
            .shares
            .get_mut(&id)
            .filter(|link| link.is_valid(now))
            .map(|link| {
                link.download_count += 1;
                link.last_accessed_at = Some(now);
                link.updated_at = now;
                link.clone()
            }))
    }

    async fn list(
        &self,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLink>> {
        let rows = self.find_all(file_id).await?;
        Ok(newest_first(rows, |l: &ShareLink| (l.created_at, l.id), page))
    }

    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<ShareLink>> {
        let state = self.state.lock().await;
        let mut rows: Vec<ShareLink> = state
            .shares
            .values()
            .filter(|l| l.file_id == file_id)
            .cloned()
            .collect();
        rows.sort_by_key(|l| (l.created_at, l.id));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use artivault_core::types::UserId;
    use artivault_entity::share::ShareLevel;

    async fn seeded_link(
        store: &MemoryStore,
        max_downloads: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
    ) -> ShareLink {
        store
            .create(&NewShareLink {
                file_id: FileId::new(),
                token: format!("tok-{}", ShareId::new()),
                created_by: UserId::new(),
                level: ShareLevel::Read,
                max_downloads,
                expires_at,
            })
            .await
            .expect("create")
    }

    #[tokio::test]
    async fn test_download_uses_callers_clock() {
        let store = MemoryStore::new();
        let expires_at = Utc::now() + Duration::hours(1);
        let link = seeded_link(&store, None, Some(expires_at)).await;

        let at_expiry = store.try_record_download(link.id, expires_at).await.expect("record");
        assert!(at_expiry.is_none());

        let before = expires_at - Duration::seconds(1);
        let counted = store
            .try_record_download(link.id, before)
            .await
            .expect("record")
            .expect("still valid");
        assert_eq!(counted.download_count, 1);
        assert_eq!(counted.last_accessed_at, Some(before));
    }

    #[tokio::test]
    async fn test_download_stops_at_quota() {
        let store = MemoryStore::new();
        let link = seeded_link(&store, Some(2), None).await;
        let now = Utc::now();

        for expected in 1..=2 {
            let row = store.try_record_download(link.id, now).await.expect("record").expect("valid");
            assert_eq!(row.download_count, expected);
        }
        assert!(store.try_record_download(link.id, now).await.expect("record").is_none());
        let stored = store.find_by_id(link.id).await.expect("find").expect("row");
        assert_eq!(stored.download_count, 2);
    }
}
