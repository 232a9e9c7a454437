//! Integration tests for permission grants and access checks.

mod helpers;

use chrono::{Duration, Utc};

use artivault_core::ErrorKind;
use artivault_core::types::PageRequest;
use artivault_entity::file::Visibility;
use artivault_entity::permission::{PermissionLevel, PermissionStatus};

use helpers::TestApp;

#[tokio::test]
async fn test_owner_and_public_access() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let anyone = app.stranger();

    assert!(app.hub.check_access(file.id, app.owner.user_id, PermissionLevel::Admin).await.expect("check"));
    assert!(!app.hub.check_access(file.id, anyone.user_id, PermissionLevel::Read).await.expect("check"));

    app.hub
        .set_visibility(&app.owner, file.id, Visibility::Public)
        .await
        .expect("public");
    assert!(app.hub.check_access(file.id, anyone.user_id, PermissionLevel::Read).await.expect("check"));
    assert!(!app.hub.check_access(file.id, anyone.user_id, PermissionLevel::Write).await.expect("check"));

    let access = app.hub.describe_access(&anyone, file.id).await.expect("describe");
    assert!(access.can_read);
    assert!(!access.can_write);
}

#[tokio::test]
async fn test_regrant_replaces_level() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let user = app.stranger();

    let first = app
        .hub
        .grant_permission(&app.owner, file.id, user.user_id, PermissionLevel::Read, None)
        .await
        .expect("grant read");
    let second = app
        .hub
        .grant_permission(&app.owner, file.id, user.user_id, PermissionLevel::Write, None)
        .await
        .expect("grant write");
    assert_eq!(first.id, second.id);

    let rows = app
        .hub
        .list_permissions(&app.owner, file.id, &PageRequest::default())
        .await
        .expect("list")
        .items;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].level, PermissionLevel::Write);
    assert_eq!(rows[0].status, PermissionStatus::Active);
    assert!(app.hub.check_access(file.id, user.user_id, PermissionLevel::Write).await.expect("check"));
}

#[tokio::test]
async fn test_revoke_keeps_row() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let user = app.stranger();
    app.hub
        .grant_permission(&app.owner, file.id, user.user_id, PermissionLevel::Admin, None)
        .await
        .expect("grant");

    app.hub
        .revoke_permission(&app.owner, file.id, user.user_id)
        .await
        .expect("revoke");
    assert!(!app.hub.check_access(file.id, user.user_id, PermissionLevel::Read).await.expect("check"));

    let stats = app.hub.permission_stats(&app.owner, file.id).await.expect("stats");
    assert_eq!(stats.total, 1);
    assert_eq!(stats.revoked, 1);

    let err = app
        .hub
        .revoke_permission(&app.owner, file.id, user.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    let err = app
        .hub
        .revoke_permission(&app.owner, file.id, app.stranger().user_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_grant_validation() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let user = app.stranger();

    let err = app
        .hub
        .grant_permission(
            &app.owner,
            file.id,
            user.user_id,
            PermissionLevel::Read,
            Some(Utc::now() - Duration::seconds(1)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .hub
        .grant_permission(
            &app.owner,
            artivault_core::types::FileId::new(),
            user.user_id,
            PermissionLevel::Read,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delegated_admin_can_grant() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let admin = app.stranger();
    let reader = app.stranger();
    app.hub
        .grant_permission(&app.owner, file.id, admin.user_id, PermissionLevel::Admin, None)
        .await
        .expect("grant admin");

    let granted = app
        .hub
        .grant_permission(&admin, file.id, reader.user_id, PermissionLevel::Read, None)
        .await
        .expect("delegated grant");
    assert_eq!(granted.granted_by, admin.user_id);
}
