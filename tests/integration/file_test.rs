//! Integration tests for uploads over the local storage provider.

mod helpers;

use std::sync::Arc;

use artivault_core::ErrorKind;
use artivault_core::config::AppConfig;
use artivault_core::traits::StorageProvider;
use artivault_core::types::UserId;
use artivault_database::Repositories;
use artivault_entity::file::Visibility;
use artivault_service::{ArtifactHub, RequestContext};
use artivault_storage::LocalStorageProvider;

use helpers::content;

#[tokio::test]
async fn test_upload_to_local_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = LocalStorageProvider::new(dir.path().to_str().expect("utf-8 path")).await.expect("local storage");
    let hub = ArtifactHub::new(Repositories::memory(), Arc::new(storage), &AppConfig::default());
    let owner = RequestContext::new(UserId::new());

    let (file, version) = hub
        .upload(&owner, "notes.md", &content("notes.md", b"# Notes"), Visibility::Private)
        .await
        .expect("upload");
    assert!(hub.storage().exists(&version.content.storage_key).await.expect("exists"));
    assert_eq!(file.head.size_bytes, 7);
    assert_eq!(file.head.mime_type, "text/plain");

    let (_, data) = hub.read_file(&owner, file.id).await.expect("read");
    assert_eq!(data.as_ref(), b"# Notes");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = AppConfig::default();
    config.storage.max_content_size_bytes = 4;
    let app = helpers::TestApp::with_config(config);

    let err = app
        .hub
        .upload(&app.owner, "big.bin", &content("big.bin", b"12345"), Visibility::Public)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_deleted_file_disappears() {
    let app = helpers::TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let stranger = app.stranger();

    let err = app.hub.delete_file(&stranger, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    app.hub.delete_file(&app.owner, file.id).await.expect("delete");
    let err = app.hub.get_file(&app.owner, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
