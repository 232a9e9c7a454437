//! Integration tests for share link creation, access, and quotas.

mod helpers;

use std::sync::Arc;

use chrono::{Duration, Utc};

use artivault_core::ErrorKind;
use artivault_entity::share::{ShareLinkPatch, ShareValidity};
use artivault_service::CreateShareRequest;

use helpers::TestApp;

fn limited(max: i32) -> CreateShareRequest {
    CreateShareRequest {
        max_downloads: Some(max),
        ..CreateShareRequest::default()
    }
}

#[tokio::test]
async fn test_token_is_url_safe() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let link = app
        .hub
        .create_share(&app.owner, file.id, &CreateShareRequest::default())
        .await
        .expect("share");

    assert_eq!(link.token.len(), 43);
    assert!(link.token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    assert!(app.hub.shares().share_url(&link).ends_with(&link.token));

    let resolved = app.hub.resolve_share(&link.token).await.expect("resolve");
    assert_eq!(resolved.id, link.id);
    assert_eq!(resolved.download_count, 0);
}

#[tokio::test]
async fn test_fourth_download_is_refused() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let link = app.hub.create_share(&app.owner, file.id, &limited(3)).await.expect("share");

    for _ in 0..3 {
        assert!(app.hub.record_download(link.id).await.expect("record"));
    }
    assert!(!app.hub.record_download(link.id).await.expect("record"));

    let link = app.hub.resolve_share(&link.token).await.expect("resolve");
    assert_eq!(link.download_count, 3);
    assert_eq!(link.validity(Utc::now()), ShareValidity::LimitReached);
    let err = app.hub.open_share(&link.token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::LimitReached);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_downloads_respect_quota() {
    let app = Arc::new(TestApp::new());
    let (file, _) = app.upload("a.txt", b"a").await;
    let link = app.hub.create_share(&app.owner, file.id, &limited(3)).await.expect("share");

    let mut handles = Vec::new();
    for _ in 0..10 {
        let app = app.clone();
        let token = link.token.clone();
        handles.push(tokio::spawn(async move { app.hub.download_shared(&token).await }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(download) => {
                assert_eq!(download.data.as_ref(), b"a");
                ok += 1;
            }
            Err(e) => assert_eq!(e.kind, ErrorKind::LimitReached),
        }
    }
    assert_eq!(ok, 3);
    let link = app.hub.resolve_share(&link.token).await.expect("resolve");
    assert_eq!(link.download_count, 3);
}

#[tokio::test]
async fn test_expired_and_revoked_links() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;

    let err = app
        .hub
        .create_share(
            &app.owner,
            file.id,
            &CreateShareRequest {
                expires_at: Some(Utc::now() - Duration::minutes(1)),
                ..CreateShareRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let link = app
        .hub
        .create_share(&app.owner, file.id, &CreateShareRequest::default())
        .await
        .expect("share");
    app.hub.revoke_share(&app.owner, link.id).await.expect("revoke");
    assert!(!app.hub.record_download(link.id).await.expect("record"));
    assert!(app.hub.open_share(&link.token).await.unwrap_err().is_not_found());

    let stats = app.hub.share_stats(&app.owner, file.id).await.expect("stats");
    assert_eq!(stats.total, 1);
    assert_eq!(stats.revoked, 1);
}

#[tokio::test]
async fn test_raising_quota_reopens_link() {
    let app = TestApp::new();
    let (file, _) = app.upload("a.txt", b"a").await;
    let link = app.hub.create_share(&app.owner, file.id, &limited(1)).await.expect("share");
    app.hub.open_share(&link.token).await.expect("first");
    assert!(app.hub.open_share(&link.token).await.is_err());

    app.hub
        .update_share(
            &app.owner,
            link.id,
            &ShareLinkPatch {
                max_downloads: Some(Some(2)),
                ..ShareLinkPatch::default()
            },
        )
        .await
        .expect("update");
    let reopened = app.hub.open_share(&link.token).await.expect("second");
    assert_eq!(reopened.download_count, 2);
}

#[tokio::test]
async fn test_unknown_token() {
    let app = TestApp::new();
    let err = app.hub.resolve_share("not-a-token").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
