//! File entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use artivault_core::AppError;
use artivault_core::types::{FileId, UserId};

use super::content::ContentDescriptor;

/// Who can read a file without an explicit grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_visibility", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Anyone may read.
    Public,
    /// Only the owner and grantees.
    Private,
}

impl Visibility {
    /// Return the visibility as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            _ => Err(AppError::validation(format!("Invalid visibility: '{s}'"))),
        }
    }
}

/// Lifecycle of a file row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Visible to every operation.
    Active,
    /// Soft-deleted; treated as absent.
    Deleted,
}

impl FileStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An uploaded artifact.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The file owner. Implicitly holds ADMIN.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Public or private.
    pub visibility: Visibility,
    /// Active or soft-deleted.
    pub status: FileStatus,
    /// Copy of the current version's content.
    #[sqlx(flatten)]
    pub head: ContentDescriptor,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the file was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl File {
    /// Whether the file has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.status == FileStatus::Deleted
    }

    /// Whether the file is readable by anyone.
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFile {
    /// Pre-allocated identifier (the storage key embeds it).
    pub id: FileId,
    /// The file owner.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Initial visibility.
    pub visibility: Visibility,
    /// Content of version "1.0".
    pub content: ContentDescriptor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse() {
        assert_eq!("PUBLIC".parse::<Visibility>().ok(), Some(Visibility::Public));
        assert!("shared".parse::<Visibility>().is_err());
    }
}
