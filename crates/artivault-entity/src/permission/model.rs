//! Permission entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use artivault_core::types::{FileId, PermissionId, UserId};

use crate::patch::double_option;

use super::level::{PermissionLevel, PermissionStatus};

/// An explicit grant of a level on one file to one user.
///
/// At most one row exists per `(file_id, grantee_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Unique permission identifier.
    pub id: PermissionId,
    /// The file the grant applies to.
    pub file_id: FileId,
    /// The user receiving the grant.
    pub grantee_id: UserId,
    /// Granted level.
    pub level: PermissionLevel,
    /// The user who last granted or updated the row.
    pub granted_by: UserId,
    /// When the grant stops being honoured.
    pub expires_at: Option<DateTime<Utc>>,
    /// Active or revoked.
    pub status: PermissionStatus,
    /// When the row was first created.
    pub created_at: DateTime<Utc>,
    /// When the row was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Whether the grant has passed its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Whether the grant is in force at `now`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.status == PermissionStatus::Active && !self.is_expired(now)
    }
}

/// Data for a grant (insert or re-grant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPermission {
    /// Target file.
    pub file_id: FileId,
    /// Target user.
    pub grantee_id: UserId,
    /// Level to grant.
    pub level: PermissionLevel,
    /// Acting user.
    pub granted_by: UserId,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update of a permission row. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionPatch {
    /// New level.
    pub level: Option<PermissionLevel>,
    /// New expiry; `Some(None)` clears it.
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    /// New status.
    pub status: Option<PermissionStatus>,
}

impl PermissionPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.expires_at.is_none() && self.status.is_none()
    }

    /// Apply the patch to a row in place.
    pub fn apply(&self, permission: &mut Permission) {
        if let Some(level) = self.level {
            permission.level = level;
        }
        if let Some(expires_at) = self.expires_at {
            permission.expires_at = expires_at;
        }
        if let Some(status) = self.status {
            permission.status = status;
        }
    }
}

/// Aggregate counts over a file's permission rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStats {
    /// All rows, any status.
    pub total: u64,
    /// Rows in force.
    pub active: u64,
    /// Active rows past their expiry.
    pub expired: u64,
    /// Revoked rows.
    pub revoked: u64,
    /// In-force rows at READ.
    pub read: u64,
    /// In-force rows at WRITE.
    pub write: u64,
    /// In-force rows at ADMIN.
    pub admin: u64,
}

impl PermissionStats {
    /// Summarise a set of rows as of `now`.
    pub fn from_rows(rows: &[Permission], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total: rows.len() as u64,
            ..Self::default()
        };
        for row in rows {
            if row.status == PermissionStatus::Revoked {
                stats.revoked += 1;
            } else if row.is_expired(now) {
                stats.expired += 1;
            } else {
                stats.active += 1;
                match row.level {
                    PermissionLevel::Read => stats.read += 1,
                    PermissionLevel::Write => stats.write += 1,
                    PermissionLevel::Admin => stats.admin += 1,
                }
            }
        }
        stats
    }
}
