//! Shared test helpers for Files API integration tests
//!
//! Provides wiremock-based mock server setup for the volume's REST surface.
//! Each helper mounts one endpoint; tests combine them as needed and get a
//! configured [`HttpRemoteStore`] pointing at the mock server.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use volsync_store::HttpRemoteStore;

/// Starts a mock server and returns it with a store adapter pointed at it.
pub async fn setup_store_mock() -> (MockServer, HttpRemoteStore) {
    let server = MockServer::start().await;
    let store = HttpRemoteStore::new(server.uri(), "test-token");
    (server, store)
}

/// Mounts a directory listing endpoint returning the given entries.
pub async fn mount_listing(server: &MockServer, dir: &str, contents: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/2.0/fs/directories{dir}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "contents": contents })),
        )
        .mount(server)
        .await;
}

/// Mounts a download endpoint for one file.
pub async fn mount_download(server: &MockServer, file: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/api/2.0/fs/files{file}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(content.to_vec(), "application/octet-stream"),
        )
        .mount(server)
        .await;
}

/// Mounts an upload endpoint for one file, expecting `overwrite=true`.
pub async fn mount_upload(server: &MockServer, file: &str) {
    Mock::given(method("PUT"))
        .and(path(format!("/api/2.0/fs/files{file}")))
        .and(query_param("overwrite", "true"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// Mounts a create-directory endpoint returning the given status code.
pub async fn mount_create_directory(server: &MockServer, dir: &str, status: u16) {
    Mock::given(method("PUT"))
        .and(path(format!("/api/2.0/fs/directories{dir}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
