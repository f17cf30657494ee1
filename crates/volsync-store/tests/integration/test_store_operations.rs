//! Integration tests for store operations (list/download/upload/create)
//!
//! Verifies end-to-end behavior of the HTTP adapter against a
//! wiremock-based mock of the Files API.

use volsync_core::domain::newtypes::VolumePath;
use volsync_core::ports::remote_store::{EntryKind, IRemoteStore};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn vp(s: &str) -> VolumePath {
    VolumePath::new(s).unwrap()
}

// ============================================================================
// Listing tests
// ============================================================================

#[tokio::test]
async fn test_list_directory_parses_entries() {
    let (server, store) = common::setup_store_mock().await;

    common::mount_listing(
        &server,
        "/Volumes/team/data",
        serde_json::json!([
            { "name": "app.json", "is_directory": false },
            { "name": "sub", "is_directory": true }
        ]),
    )
    .await;

    let entries = store
        .list_directory(&vp("/Volumes/team/data"))
        .await
        .expect("listing failed");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "app.json");
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[1].name, "sub");
    assert_eq!(entries[1].kind, EntryKind::Directory);
}

#[tokio::test]
async fn test_list_empty_directory() {
    let (server, store) = common::setup_store_mock().await;

    // An empty directory may omit the contents field entirely.
    Mock::given(method("GET"))
        .and(path("/api/2.0/fs/directories/Volumes/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let entries = store
        .list_directory(&vp("/Volumes/empty"))
        .await
        .expect("listing failed");
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_list_missing_directory_is_error() {
    let (server, store) = common::setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/2.0/fs/directories/Volumes/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("RESOURCE_DOES_NOT_EXIST"))
        .mount(&server)
        .await;

    let err = store
        .list_directory(&vp("/Volumes/missing"))
        .await
        .expect_err("404 should surface as an error");
    let msg = format!("{err:#}");
    assert!(msg.contains("404"), "error should carry the status: {msg}");
}

// ============================================================================
// Download tests
// ============================================================================

#[tokio::test]
async fn test_download_returns_content() {
    let (server, store) = common::setup_store_mock().await;

    let content = b"Hello, volume!";
    common::mount_download(&server, "/Volumes/team/notes.txt", content).await;

    let data = store
        .download(&vp("/Volumes/team/notes.txt"))
        .await
        .expect("download failed");
    assert_eq!(data, content);
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, store) = common::setup_store_mock().await;

    common::mount_download(&server, "/Volumes/team/empty.bin", &[]).await;

    let data = store
        .download(&vp("/Volumes/team/empty.bin"))
        .await
        .expect("download failed");
    assert!(data.is_empty());
}

// ============================================================================
// Upload tests
// ============================================================================

#[tokio::test]
async fn test_upload_sends_bytes_with_overwrite() {
    let (server, store) = common::setup_store_mock().await;

    common::mount_upload(&server, "/Volumes/team/out.txt").await;

    store
        .upload(&vp("/Volumes/team/out.txt"), b"payload")
        .await
        .expect("upload failed");

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .expect("no PUT recorded");
    assert_eq!(put.body, b"payload");
}

#[tokio::test]
async fn test_upload_surfaces_server_error() {
    let (server, store) = common::setup_store_mock().await;

    Mock::given(method("PUT"))
        .and(path("/api/2.0/fs/files/Volumes/team/out.txt"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let err = store
        .upload(&vp("/Volumes/team/out.txt"), b"payload")
        .await
        .expect_err("500 should surface as an error");
    assert!(format!("{err:#}").contains("500"));
}

// ============================================================================
// Create-directory tests
// ============================================================================

#[tokio::test]
async fn test_create_directory_succeeds() {
    let (server, store) = common::setup_store_mock().await;

    common::mount_create_directory(&server, "/Volumes/team/new", 204).await;

    store
        .create_directory(&vp("/Volumes/team/new"))
        .await
        .expect("create failed");
}

#[tokio::test]
async fn test_create_directory_conflict_is_success() {
    let (server, store) = common::setup_store_mock().await;

    // Already-exists must behave as create-if-absent.
    common::mount_create_directory(&server, "/Volumes/team/existing", 409).await;

    store
        .create_directory(&vp("/Volumes/team/existing"))
        .await
        .expect("409 should be treated as success");
}

// ============================================================================
// Auth header
// ============================================================================

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let server = MockServer::start().await;
    let store = volsync_store::HttpRemoteStore::new(server.uri(), "secret-token");

    Mock::given(method("GET"))
        .and(path("/api/2.0/fs/files/Volumes/auth.txt"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"ok".to_vec(), "application/octet-stream"))
        .mount(&server)
        .await;

    let data = store
        .download(&vp("/Volumes/auth.txt"))
        .await
        .expect("authorized download failed");
    assert_eq!(data, b"ok");
}
