use async_trait::async_trait;
use chrono::Utc;

use artivault_core::error::AppError;
use artivault_core::result::AppResult;
use artivault_core::types::{FileId, PageRequest, PageResponse, VersionId};
use artivault_entity::file::{ContentDescriptor, File, FileStatus, NewFile};
use artivault_entity::version::{INITIAL_LABEL, NewVersion, Rollback, Version, next_label};

use super::{MemoryStore, Tables};
use crate::repositories::VersionRepository;

impl Tables {
    fn write_head(&mut self, file_id: FileId, content: &ContentDescriptor) -> AppResult<File> {
        let file = self
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        file.head = content.clone();
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    fn clear_current(&mut self, file_id: FileId) -> Option<Version> {
        self.versions
            .values_mut()
            .find(|v| v.file_id == file_id && v.is_current)
            .map(|v| {
                v.is_current = false;
                v.clone()
            })
    }
}

#[async_trait]
impl VersionRepository for MemoryStore {
    async fn insert_initial(
        &self,
        file: &NewFile,
        change_note: Option<&str>,
    ) -> AppResult<(File, Version)> {
        let mut state = self.state.lock().await;
        if state.files.contains_key(&file.id) {
            return Err(AppError::conflict(format!("File {} already exists", file.id)));
        }
        let now = Utc::now();
        let created = File {
            id: file.id,
            owner_id: file.owner_id,
            name: file.name.clone(),
            visibility: file.visibility,
            status: FileStatus::Active,
            head: file.content.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let version = Version {
            id: VersionId::new(),
            file_id: file.id,
            sequence_number: 1,
            version_label: INITIAL_LABEL.to_string(),
            content: file.content.clone(),
            change_note: change_note.map(str::to_string),
            created_by: file.owner_id,
            created_at: now,
            is_current: true,
        };
        state.files.insert(created.id, created.clone());
        state.versions.insert(version.id, version.clone());
        Ok((created, version))
    }

    async fn append(&self, data: &NewVersion) -> AppResult<(File, Version)> {
        let mut state = self.state.lock().await;
        if state.active_file(data.file_id).is_none() {
            return Err(AppError::not_found(format!("File {} not found", data.file_id)));
        }

        let latest = state
            .versions_of(data.file_id)
            .max_by_key(|v| v.sequence_number)
            .map(|v| (v.sequence_number, v.version_label.clone()));
        let sequence_number = latest.as_ref().map_or(1, |(seq, _)| seq + 1);
        let label = next_label(latest.as_ref().map(|(_, label)| label.as_str()));

        state.clear_current(data.file_id);
        let version = Version {
            id: VersionId::new(),
            file_id: data.file_id,
            sequence_number,
            version_label: label,
            content: data.content.clone(),
            change_note: data.change_note.clone(),
            created_by: data.created_by,
            created_at: Utc::now(),
            is_current: true,
        };
        state.versions.insert(version.id, version.clone());
        let file = state.write_head(data.file_id, &data.content)?;
        Ok((file, version))
    }

    async fn rollback(&self, file_id: FileId, version_id: VersionId) -> AppResult<Rollback> {
        let mut state = self.state.lock().await;
        if state.active_file(file_id).is_none() {
            return Err(AppError::not_found(format!("File {file_id} not found")));
        }
        let target = state
            .versions
            .get(&version_id)
            .filter(|v| v.file_id == file_id)
            .cloned()
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version_id} not found for file {file_id}"))
            })?;

        if target.is_current {
            return Ok(Rollback {
                current: target,
                previous: None,
            });
        }

        let previous = state.clear_current(file_id);
        let current = match state.versions.get_mut(&version_id) {
            Some(v) => {
                v.is_current = true;
                v.clone()
            }
            None => return Err(AppError::internal("Version vanished during rollback")),
        };
        state.write_head(file_id, &current.content)?;
        Ok(Rollback { current, previous })
    }

    async fn delete(&self, version_id: VersionId) -> AppResult<Version> {
        let mut state = self.state.lock().await;
        let version = state
            .versions
            .get(&version_id)
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))?;
        if version.is_current {
            return Err(AppError::invalid_state(format!(
                "Version {} is the current version of file {} and cannot be deleted",
                version.version_label, version.file_id
            )));
        }
        state
            .versions
            .remove(&version_id)
            .ok_or_else(|| AppError::not_found(format!("Version {version_id} not found")))
    }

    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<Version>> {
        let state = self.state.lock().await;
        Ok(state.versions.get(&id).cloned())
    }

    async fn current(&self, file_id: FileId) -> AppResult<Option<Version>> {
        let state = self.state.lock().await;
        Ok(state.versions_of(file_id).find(|v| v.is_current).cloned())
    }

    async fn latest(&self, file_id: FileId) -> AppResult<Option<Version>> {
        let state = self.state.lock().await;
        Ok(state
            .versions_of(file_id)
            .max_by_key(|v| v.sequence_number)
            .cloned())
    }

    async fn list(&self, file_id: FileId, page: &PageRequest) -> AppResult<PageResponse<Version>> {
        let mut rows = self.find_all(file_id).await?;
        rows.reverse();
        Ok(PageResponse::from_ordered(rows, page))
    }

    async fn find_all(&self, file_id: FileId) -> AppResult<Vec<Version>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Version> = state.versions_of(file_id).cloned().collect();
        rows.sort_by_key(|v| v.sequence_number);
        Ok(rows)
    }
}
