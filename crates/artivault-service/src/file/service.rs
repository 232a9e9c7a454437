//! File upload, lookup, visibility, and soft deletion.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, UserId};
use artivault_database::repositories::FileRepository;
use artivault_entity::file::{File, NewFile, Visibility};
use artivault_entity::version::Version;

use crate::content::{ContentUpload, ContentWriter};
use crate::version::VersionService;

/// Handles uploads and the file lifecycle.
#[derive(Clone)]
pub struct FileService {
    /// File repository.
    files: Arc<dyn FileRepository>,
    /// Creates the initial version on upload.
    versions: VersionService,
    /// Blob writer.
    content: ContentWriter,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish()
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        versions: VersionService,
        content: ContentWriter,
    ) -> Self {
        Self {
            files,
            versions,
            content,
        }
    }

    /// Store content as a new file owned by `owner_id` with version "1.0".
    pub async fn upload(
        &self,
        owner_id: UserId,
        name: &str,
        upload: &ContentUpload,
        visibility: Visibility,
    ) -> AppResult<(File, Version)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("File name must not be empty"));
        }
        self.content.validate(upload)?;

        let file_id = FileId::new();
        let content = self.content.store(file_id, upload).await?;
        let created = self
            .versions
            .create_initial(
                &NewFile {
                    id: file_id,
                    owner_id,
                    name: name.to_string(),
                    visibility,
                    content: content.clone(),
                },
                None,
            )
            .await;

        match created {
            Ok((file, version)) => {
                info!(
                    file_id = %file.id,
                    user_id = %owner_id,
                    size = file.head.size_bytes,
                    visibility = %file.visibility,
                    "File uploaded"
                );
                Ok((file, version))
            }
            Err(e) => {
                self.content.discard(&content).await;
                Err(e)
            }
        }
    }

    /// Get an active file.
    pub async fn get(&self, file_id: FileId) -> AppResult<File> {
        self.files
            .find_by_id(file_id)
            .await?
            .filter(|f| !f.is_deleted())
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// List a user's active files, newest first.
    pub async fn list_by_owner(
        &self,
        owner_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>> {
        self.files.list_by_owner(owner_id, page).await
    }

    /// Change who can read a file without a grant.
    pub async fn set_visibility(&self, file_id: FileId, visibility: Visibility) -> AppResult<File> {
        let file = self
            .files
            .set_visibility(file_id, visibility)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        info!(file_id = %file_id, visibility = %visibility, "File visibility changed");
        Ok(file)
    }

    /// Soft-delete a file. Its versions, grants, and links stay in place but
    /// stop granting access.
    pub async fn delete(&self, file_id: FileId) -> AppResult<File> {
        let file = self
            .files
            .soft_delete(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        info!(file_id = %file_id, "File deleted");
        Ok(file)
    }

    /// Read the content of the file's current version.
    pub async fn read_current(&self, file_id: FileId) -> AppResult<(File, Bytes)> {
        let file = self.get(file_id).await?;
        let data = self.content.read(&file.head).await?;
        debug!(file_id = %file_id, bytes = data.len(), "File content read");
        Ok((file, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artivault_core::ErrorKind;
    use artivault_database::Repositories;
    use artivault_storage::MemoryStorageProvider;

    fn service() -> (MemoryStorageProvider, FileService) {
        let repos = Repositories::memory();
        let storage = MemoryStorageProvider::new();
        let writer = ContentWriter::new(Arc::new(storage.clone()), 1024);
        let versions = VersionService::new(repos.files.clone(), repos.versions.clone(), writer.clone(), 100);
        (storage, FileService::new(repos.files, versions, writer))
    }

    #[tokio::test]
    async fn test_upload_creates_first_version() {
        let (storage, svc) = service();
        let owner = UserId::new();
        let (file, version) = svc
            .upload(
                owner,
                " report.pdf ",
                &ContentUpload::new(&b"%PDF"[..], "report.pdf").with_mime_type("application/pdf"),
                Visibility::Private,
            )
            .await
            .expect("upload");

        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.owner_id, owner);
        assert_eq!(version.version_label, "1.0");
        assert!(version.is_current);
        assert_eq!(version.content, file.head);
        assert_eq!(file.head.mime_type, "application/pdf");
        assert_eq!(storage.len(), 1);

        let (_, data) = svc.read_current(file.id).await.expect("read");
        assert_eq!(data.as_ref(), b"%PDF");
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let (storage, svc) = service();
        let err = svc
            .upload(UserId::new(), "  ", &ContentUpload::new(&b"x"[..], "x"), Visibility::Public)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = svc
            .upload(UserId::new(), "x", &ContentUpload::new(Bytes::new(), "x"), Visibility::Public)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_visibility_and_delete() {
        let (_, svc) = service();
        let owner = UserId::new();
        let (file, _) = svc
            .upload(owner, "a.txt", &ContentUpload::new(&b"a"[..], "a.txt"), Visibility::Private)
            .await
            .expect("upload");

        let updated = svc.set_visibility(file.id, Visibility::Public).await.expect("visibility");
        assert!(updated.is_public());

        let deleted = svc.delete(file.id).await.expect("delete");
        assert!(deleted.is_deleted());
        assert!(svc.get(file.id).await.unwrap_err().is_not_found());
        assert!(svc.delete(file.id).await.unwrap_err().is_not_found());
        assert!(svc.read_current(file.id).await.unwrap_err().is_not_found());

        let listed = svc.list_by_owner(owner, &PageRequest::default()).await.expect("list");
        assert!(listed.items.is_empty());
    }
}
