//! Integration tests for version history through the hub.

mod helpers;

use std::sync::Arc;

use artivault_core::ErrorKind;
use artivault_core::types::PageRequest;
use artivault_entity::permission::PermissionLevel;

use helpers::{TestApp, content};

#[tokio::test]
async fn test_upload_version_rollback_scenario() {
    let app = TestApp::new();
    let (file, v1) = app.upload("design.txt", b"first draft").await;
    assert_eq!(v1.version_label, "1.0");
    assert!(v1.is_current);

    let v2 = app
        .hub
        .create_version(&app.owner, file.id, &content("design.txt", b"second draft"), Some("review"))
        .await
        .expect("create version");
    assert_eq!(v2.version_label, "1.1");

    let versions = app
        .hub
        .list_versions(&app.owner, file.id, &PageRequest::default())
        .await
        .expect("list")
        .items;
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].id, v2.id);
    assert!(versions[0].is_current);
    assert!(!versions[1].is_current);

    let outcome = app
        .hub
        .rollback_version(&app.owner, file.id, v1.id)
        .await
        .expect("rollback");
    assert_eq!(outcome.current.id, v1.id);
    assert!(outcome.current.is_current);
    assert_eq!(outcome.previous.as_ref().map(|v| v.id), Some(v2.id));

    let head = app.hub.get_file(&app.owner, file.id).await.expect("file");
    assert_eq!(head.head, v1.content);
    let (_, data) = app.hub.read_file(&app.owner, file.id).await.expect("read");
    assert_eq!(data.as_ref(), b"first draft");

    // History is kept: the next version continues from the latest label.
    let v3 = app
        .hub
        .create_version(&app.owner, file.id, &content("design.txt", b"third"), None)
        .await
        .expect("create after rollback");
    assert_eq!(v3.version_label, "1.2");
}

#[tokio::test]
async fn test_delete_current_version_is_invalid() {
    let app = TestApp::new();
    let (_, v1) = app.upload("a.txt", b"a").await;
    let err = app.hub.delete_version(&app.owner, v1.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert_eq!(app.storage.len(), 1);
}

#[tokio::test]
async fn test_reader_cannot_write_versions() {
    let app = TestApp::new();
    let (file, v1) = app.upload("a.txt", b"a").await;
    let reader = app.stranger();
    app.hub
        .grant_permission(&app.owner, file.id, reader.user_id, PermissionLevel::Read, None)
        .await
        .expect("grant");

    let stats = app.hub.version_stats(&reader, file.id).await.expect("stats");
    assert_eq!(stats.total_versions, 1);

    let err = app
        .hub
        .create_version(&reader, file.id, &content("a.txt", b"b"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
    let err = app
        .hub
        .rollback_version(&reader, file.id, v1.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_versions_keep_one_current() {
    let app = Arc::new(TestApp::new());
    let (file, _) = app.upload("busy.txt", b"0").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.hub
                .create_version(&app.owner, file.id, &content("busy.txt", b"n"), None)
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("create version");
    }

    let versions = app
        .hub
        .list_versions(&app.owner, file.id, &PageRequest::new(1, 100))
        .await
        .expect("list")
        .items;
    assert_eq!(versions.len(), 9);
    assert_eq!(versions.iter().filter(|v| v.is_current).count(), 1);

    let mut labels: Vec<_> = versions.iter().map(|v| v.version_label.clone()).collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), 9);

    let stats = app.hub.version_stats(&app.owner, file.id).await.expect("stats");
    assert_eq!(stats.current_version_label.as_deref(), Some("1.8"));
}
