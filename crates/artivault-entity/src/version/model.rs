//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use artivault_core::types::{FileId, UserId, VersionId};

use crate::file::ContentDescriptor;

/// One revision of a file's content.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Version {
    /// Unique version identifier.
    pub id: VersionId,
    /// The file this version belongs to.
    pub file_id: FileId,
    /// Per-file insertion ordinal; the highest is the latest version.
    pub sequence_number: i32,
    /// `major.minor` label.
    pub version_label: String,
    /// The revision's content.
    #[sqlx(flatten)]
    pub content: ContentDescriptor,
    /// Optional description of the change.
    pub change_note: Option<String>,
    /// User who created this version.
    pub created_by: UserId,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// Whether this is the file's canonical version.
    pub is_current: bool,
}

/// Data required to append a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVersion {
    /// The file to append to.
    pub file_id: FileId,
    /// Content of the new version.
    pub content: ContentDescriptor,
    /// Optional change description.
    pub change_note: Option<String>,
    /// Acting user.
    pub created_by: UserId,
}

/// Outcome of a rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rollback {
    /// The version that is now current.
    pub current: Version,
    /// The version that was current before, if it changed.
    pub previous: Option<Version>,
}

impl Rollback {
    /// Whether the rollback changed anything.
    pub fn changed(&self) -> bool {
        self.previous.is_some()
    }
}
