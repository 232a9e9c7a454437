//! Version history: create, roll back, delete, and inspect revisions.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, UserId, VersionId};
use artivault_database::repositories::{FileRepository, VersionRepository};
use artivault_entity::file::{File, NewFile};
use artivault_entity::version::{NewVersion, Rollback, Version, VersionStats, next_label};

use crate::content::{ContentUpload, ContentWriter};

/// Manages file version history and the current-version pointer.
///
/// Callers are expected to have checked access on the file first.
#[derive(Clone)]
pub struct VersionService {
    /// File repository.
    files: Arc<dyn FileRepository>,
    /// Version repository.
    versions: Arc<dyn VersionRepository>,
    /// Blob writer.
    content: ContentWriter,
    /// Longest accepted change note, in characters.
    max_change_note_chars: usize,
}

impl std::fmt::Debug for VersionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionService")
            .field("max_change_note_chars", &self.max_change_note_chars)
            .finish()
    }
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        versions: Arc<dyn VersionRepository>,
        content: ContentWriter,
        max_change_note_chars: usize,
    ) -> Self {
        Self {
            files,
            versions,
            content,
            max_change_note_chars,
        }
    }

    fn validate_note(&self, note: Option<&str>) -> AppResult<()> {
        if let Some(note) = note {
            let chars = note.chars().count();
            if chars > self.max_change_note_chars {
                return Err(AppError::validation(format!(
                    "Change note is {chars} characters; the maximum is {}",
                    self.max_change_note_chars
                )));
            }
        }
        Ok(())
    }

    async fn active_file(&self, file_id: FileId) -> AppResult<File> {
        self.files
            .find_by_id(file_id)
            .await?
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Insert a file and its version "1.0" in one step.
    ///
    /// The content must already be stored. Called once, at upload.
    pub async fn create_initial(
        &self,
        file: &NewFile,
        change_note: Option<&str>,
    ) -> AppResult<(File, Version)> {
        self.validate_note(change_note)?;
        let (file, version) = self
            .versions
            .insert_initial(file, change_note.or(Some("Initial version")))
            .await?;
        info!(
            file_id = %file.id,
            version_id = %version.id,
            user_id = %file.owner_id,
            "Initial version created"
        );
        Ok((file, version))
    }

    /// The label the next version of a file would get.
    pub async fn next_version_label(&self, file_id: FileId) -> AppResult<String> {
        let latest = self.versions.latest(file_id).await?;
        Ok(next_label(latest.as_ref().map(|v| v.version_label.as_str())))
    }

    /// Store new content and make it the current version.
    ///
    /// The previous current version stays in the history. If the database
    /// step fails the stored blob is removed again.
    pub async fn create_version(
        &self,
        file_id: FileId,
        upload: &ContentUpload,
        change_note: Option<&str>,
        created_by: UserId,
    ) -> AppResult<Version> {
        self.validate_note(change_note)?;
        self.content.validate(upload)?;
        self.active_file(file_id).await?;

        let descriptor = self.content.store(file_id, upload).await?;
        let appended = self
            .versions
            .append(&NewVersion {
                file_id,
                content: descriptor.clone(),
                change_note: change_note.map(str::to_string),
                created_by,
            })
            .await;

        match appended {
            Ok((_, version)) => {
                info!(
                    file_id = %file_id,
                    version_id = %version.id,
                    label = %version.version_label,
                    user_id = %created_by,
                    "Version created"
                );
                Ok(version)
            }
            Err(e) => {
                self.content.discard(&descriptor).await;
                Err(e)
            }
        }
    }

    /// Make an earlier version current again and mirror it onto the file.
    ///
    /// Rolling back to the version that is already current changes nothing.
    pub async fn rollback(&self, file_id: FileId, version_id: VersionId) -> AppResult<Rollback> {
        let outcome = self.versions.rollback(file_id, version_id).await?;
        if outcome.changed() {
            info!(
                file_id = %file_id,
                version_id = %version_id,
                label = %outcome.current.version_label,
                previous = ?outcome.previous.as_ref().map(|v| &v.version_label),
                "Rolled back to version"
            );
        } else {
            debug!(file_id = %file_id, version_id = %version_id, "Rollback target already current");
        }
        Ok(outcome)
    }

    /// Delete a non-current version and, best effort, its blob.
    pub async fn delete(&self, version_id: VersionId) -> AppResult<Version> {
        let version = self.versions.delete(version_id).await?;
        self.content.discard(&version.content).await;
        info!(
            file_id = %version.file_id,
            version_id = %version_id,
            label = %version.version_label,
            "Version deleted"
        );
        Ok(version)
    }

    /// Get a version by ID.
    pub async fn get(&self, version_id: VersionId) -> AppResult<Version> {
        self.versions
            .find_by_id(version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))
    }

    /// The current version of a file.
    pub async fn current(&self, file_id: FileId) -> AppResult<Version> {
        self.versions
            .current(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} has no current version")))
    }

    /// List a file's versions, newest first.
    pub async fn list(&self, file_id: FileId, page: &PageRequest) -> AppResult<PageResponse<Version>> {
        self.active_file(file_id).await?;
        self.versions.list(file_id, page).await
    }

    /// Summary of a file's version history.
    pub async fn stats(&self, file_id: FileId) -> AppResult<VersionStats> {
        self.active_file(file_id).await?;
        let versions = self.versions.find_all(file_id).await?;
        Ok(VersionStats::from_versions(&versions))
    }

    /// Read a version's content.
    pub async fn read_content(&self, version: &Version) -> AppResult<Bytes> {
        self.content.read(&version.content).await
    }
}
