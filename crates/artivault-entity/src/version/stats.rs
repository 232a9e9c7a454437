//! Version history statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use artivault_core::types::UserId;

use crate::file::human_readable_size;

use super::model::Version;

/// Summary of a file's version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionStats {
    /// Number of versions.
    pub total_versions: u64,
    /// Label of the current version.
    pub current_version_label: Option<String>,
    /// Creation time of the oldest version.
    pub first_version_at: Option<DateTime<Utc>>,
    /// Creation time of the newest version.
    pub last_version_at: Option<DateTime<Utc>>,
    /// Version count per creator.
    pub versions_by_creator: BTreeMap<UserId, u64>,
    /// Sum of all version sizes.
    pub total_size_bytes: i64,
    /// `total_size_bytes` formatted for display.
    pub human_readable_total_size: String,
}

impl VersionStats {
    /// Summarise a set of versions.
    pub fn from_versions(versions: &[Version]) -> Self {
        let mut by_creator = BTreeMap::new();
        for version in versions {
            *by_creator.entry(version.created_by).or_insert(0) += 1;
        }
        let total_size_bytes = versions.iter().map(|v| v.content.size_bytes).sum();
        Self {
            total_versions: versions.len() as u64,
            current_version_label: versions
                .iter()
                .find(|v| v.is_current)
                .map(|v| v.version_label.clone()),
            first_version_at: versions.iter().map(|v| v.created_at).min(),
            last_version_at: versions.iter().map(|v| v.created_at).max(),
            versions_by_creator: by_creator,
            total_size_bytes,
            human_readable_total_size: human_readable_size(total_size_bytes),
        }
    }
}
