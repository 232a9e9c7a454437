//! Content descriptor shared by a file head and its versions.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Where a blob lives and what it contains.
///
/// A [`File`](super::File) carries a copy of its current version's
/// descriptor so that reads never need to join the version table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ContentDescriptor {
    /// Opaque key in the content storage provider.
    pub storage_key: String,
    /// Blob size in bytes.
    pub size_bytes: i64,
    /// MIME type reported at upload.
    pub mime_type: String,
    /// Client-supplied file name of the upload.
    pub original_name: String,
    /// Lowercase hex SHA-256 of the blob.
    pub checksum_sha256: String,
}

/// Format a byte count with one decimal place and a binary unit.
pub fn human_readable_size(bytes: i64) -> String {
    let mut size = bytes.max(0) as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}
