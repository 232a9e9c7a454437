//! Share link entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use artivault_core::AppError;
use artivault_core::types::{FileId, ShareId, UserId};

use crate::patch::double_option;

use super::validity::ShareValidity;

/// Level carried by a share link. Links never confer ADMIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareLevel {
    /// Download only.
    Read,
    /// Download and upload.
    Write,
}

impl ShareLevel {
    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for ShareLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShareLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            _ => Err(AppError::validation(format!("Invalid share level: '{s}'"))),
        }
    }
}

/// Lifecycle of a share link row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    /// Usable, subject to expiry and quota.
    Active,
    /// Revoked; kept for audit.
    Revoked,
}

impl ShareStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An anonymous bearer capability on one file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareLink {
    /// Unique share identifier.
    pub id: ShareId,
    /// The shared file.
    pub file_id: FileId,
    /// URL-safe bearer token.
    pub token: String,
    /// User who created the link.
    pub created_by: UserId,
    /// Level conferred on the bearer.
    pub level: ShareLevel,
    /// Maximum number of downloads (None = unlimited).
    pub max_downloads: Option<i32>,
    /// Downloads recorded so far.
    pub download_count: i32,
    /// When the link expires (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// Active or revoked.
    pub status: ShareStatus,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When the link was last changed.
    pub updated_at: DateTime<Utc>,
    /// Last successful download.
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl ShareLink {
    /// Compute the link's validity at `now`.
    ///
    /// Revocation wins over expiry, and expiry over an exhausted quota.
    pub fn validity(&self, now: DateTime<Utc>) -> ShareValidity {
        if self.status != ShareStatus::Active {
            return ShareValidity::Revoked;
        }
        if self.expires_at.is_some_and(|exp| now >= exp) {
            return ShareValidity::Expired;
        }
        if self.is_exhausted() {
            return ShareValidity::LimitReached;
        }
        ShareValidity::Valid
    }

    /// Check if the link is currently usable.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.validity(now).is_valid()
    }

    /// Whether the download quota is used up.
    pub fn is_exhausted(&self) -> bool {
        self.max_downloads
            .is_some_and(|max| self.download_count >= max)
    }

    /// Downloads left before the quota is reached.
    pub fn remaining_downloads(&self) -> Option<i32> {
        self.max_downloads
            .map(|max| (max - self.download_count).max(0))
    }
}

/// Data required to create a new share link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShareLink {
    /// The file to share.
    pub file_id: FileId,
    /// Generated bearer token.
    pub token: String,
    /// Acting user.
    pub created_by: UserId,
    /// Level conferred.
    pub level: ShareLevel,
    /// Max downloads (None = unlimited).
    pub max_downloads: Option<i32>,
    /// Expiry (None = never).
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update of a share link. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareLinkPatch {
    /// New level.
    pub level: Option<ShareLevel>,
    /// New quota; `Some(None)` removes it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub max_downloads: Option<Option<i32>>,
    /// New expiry; `Some(None)` removes it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    /// New status.
    pub status: Option<ShareStatus>,
}

impl ShareLinkPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.max_downloads.is_none()
            && self.expires_at.is_none()
            && self.status.is_none()
    }

    /// Apply the patch to a link in place.
    pub fn apply(&self, link: &mut ShareLink) {
        if let Some(level) = self.level {
            link.level = level;
        }
        if let Some(max_downloads) = self.max_downloads {
            link.max_downloads = max_downloads;
        }
        if let Some(expires_at) = self.expires_at {
            link.expires_at = expires_at;
        }
        if let Some(status) = self.status {
            link.status = status;
        }
    }
}

/// Aggregate counts over a file's share links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareStats {
    /// All links, any status.
    pub total: u64,
    /// Links usable right now.
    pub active: u64,
    /// Active links past their expiry.
    pub expired: u64,
    /// Active links whose quota is used up.
    pub exhausted: u64,
    /// Revoked links.
    pub revoked: u64,
    /// Sum of download counters.
    pub total_downloads: u64,
}

impl ShareStats {
    /// Summarise a set of links as of `now`.
    pub fn from_links(links: &[ShareLink], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total: links.len() as u64,
            ..Self::default()
        };
        for link in links {
            stats.total_downloads += link.download_count.max(0) as u64;
            match link.validity(now) {
                ShareValidity::Valid => stats.active += 1,
                ShareValidity::Revoked => stats.revoked += 1,
                ShareValidity::Expired => stats.expired += 1,
                ShareValidity::LimitReached => stats.exhausted += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(max: Option<i32>, count: i32, expires_in: Option<i64>) -> ShareLink {
        let now = Utc::now();
        ShareLink {
            id: ShareId::new(),
            file_id: FileId::new(),
            token: "t".to_string(),
            created_by: UserId::new(),
            level: ShareLevel::Read,
            max_downloads: max,
            download_count: count,
            expires_at: expires_in.map(|secs| now + Duration::seconds(secs)),
            status: ShareStatus::Active,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
        }
    }

    #[test]
    fn test_validity_rules() {
        let now = Utc::now();
        assert_eq!(link(None, 0, None).validity(now), ShareValidity::Valid);
        assert_eq!(link(Some(3), 2, None).validity(now), ShareValidity::Valid);
        assert_eq!(link(Some(3), 3, None).validity(now), ShareValidity::LimitReached);
        assert_eq!(link(None, 0, Some(-1)).validity(now), ShareValidity::Expired);

        let mut revoked = link(Some(1), 1, Some(-1));
        revoked.status = ShareStatus::Revoked;
        assert_eq!(revoked.validity(now), ShareValidity::Revoked);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let mut l = link(None, 0, None);
        let at = Utc::now();
        l.expires_at = Some(at);
        assert!(!l.is_valid(at));
        assert!(l.is_valid(at - Duration::milliseconds(1)));
    }

    #[test]
    fn test_patch_json_null_lifts_limits() {
        let patch: ShareLinkPatch =
            serde_json::from_str(r#"{"max_downloads":null,"expires_at":null}"#).expect("parse");
        assert_eq!(patch.max_downloads, Some(None));
        assert_eq!(patch.expires_at, Some(None));

        let mut limited = link(Some(3), 1, Some(60));
        patch.apply(&mut limited);
        assert_eq!(limited.max_downloads, None);
        assert_eq!(limited.expires_at, None);

        let untouched: ShareLinkPatch = serde_json::from_str(r#"{"max_downloads":5}"#).expect("parse");
        assert_eq!(untouched.max_downloads, Some(Some(5)));
        assert_eq!(untouched.expires_at, None);
        assert!(serde_json::from_str::<ShareLinkPatch>("{}").expect("parse").is_empty());
    }

    #[test]
    fn test_remaining_downloads() {
        assert_eq!(link(Some(3), 1, None).remaining_downloads(), Some(2));
        assert_eq!(link(None, 9, None).remaining_downloads(), None);
    }

    #[test]
    fn test_stats() {
        let mut revoked = link(None, 4, None);
        revoked.status = ShareStatus::Revoked;
        let links = vec![
            link(None, 1, None),
            link(Some(2), 2, None),
            link(None, 0, Some(-10)),
            revoked,
        ];
        let stats = ShareStats::from_links(&links, Utc::now());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.exhausted, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.revoked, 1);
        assert_eq!(stats.total_downloads, 7);
    }
}
