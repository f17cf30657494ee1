//! Files API client
//!
//! Provides a typed HTTP client for the remote volume's Files-API-style REST
//! surface. Handles authentication headers, endpoint construction, and JSON
//! deserialization of directory listings.
//!
//! ## Endpoints
//!
//! - `PUT  /api/2.0/fs/directories{path}` - create directory (idempotent)
//! - `GET  /api/2.0/fs/directories{path}` - list directory contents
//! - `GET  /api/2.0/fs/files{path}` - download raw bytes
//! - `PUT  /api/2.0/fs/files{path}?overwrite=true` - upload raw bytes

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use volsync_core::domain::newtypes::VolumePath;
use volsync_core::ports::remote_store::{EntryKind, VolumeEntry};

/// API prefix for file content operations.
const FILES_PREFIX: &str = "/api/2.0/fs/files";

/// API prefix for directory operations.
const DIRECTORIES_PREFIX: &str = "/api/2.0/fs/directories";

// ============================================================================
// Listing response types
// ============================================================================

/// Response body of `GET /api/2.0/fs/directories{path}`.
#[derive(Debug, Deserialize)]
struct ListDirectoryResponse {
    /// Directory entries; absent for an empty directory.
    #[serde(default)]
    contents: Vec<DirectoryEntryResponse>,
}

/// A single entry in a directory listing response.
#[derive(Debug, Deserialize)]
struct DirectoryEntryResponse {
    /// Entry name
    name: String,
    /// Whether the entry is a directory
    #[serde(default)]
    is_directory: bool,
}

// ============================================================================
// FilesClient
// ============================================================================

/// HTTP client for the remote volume's Files API.
///
/// Wraps `reqwest::Client` with bearer authentication and base URL
/// construction. All operations are whole-object; no chunked transfer.
pub struct FilesClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without a trailing slash
    base_url: String,
    /// Bearer token for authentication
    token: String,
}

impl FilesClient {
    /// Creates a new `FilesClient`.
    ///
    /// # Arguments
    /// * `base_url` - Workspace base URL, e.g. `https://workspace.example.com`
    /// * `token` - Bearer token for API authentication
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Creates an authenticated request builder for the given method and path.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url).bearer_auth(&self.token)
    }

    /// Builds the URL path for an API prefix plus a volume path, encoding
    /// each segment but preserving `/` separators.
    fn api_path(prefix: &str, path: &VolumePath) -> String {
        let encoded: Vec<String> = path
            .as_str()
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        format!("{}{}", prefix, encoded.join("/"))
    }

    /// Creates a directory if absent.
    ///
    /// The API returns 204 on creation; a 409 means the directory already
    /// exists, which this client treats as success (create-if-absent).
    pub async fn create_directory(&self, path: &VolumePath) -> Result<()> {
        debug!(path = %path, "creating remote directory");

        let response = self
            .request(Method::PUT, &Self::api_path(DIRECTORIES_PREFIX, path))
            .send()
            .await
            .with_context(|| format!("PUT directory {path} failed"))?;

        if response.status() == StatusCode::CONFLICT {
            debug!(path = %path, "remote directory already exists");
            return Ok(());
        }

        Self::check_status(response, "create directory", path).await?;
        Ok(())
    }

    /// Lists the immediate children of a directory.
    pub async fn list_directory(&self, path: &VolumePath) -> Result<Vec<VolumeEntry>> {
        debug!(path = %path, "listing remote directory");

        let response = self
            .request(Method::GET, &Self::api_path(DIRECTORIES_PREFIX, path))
            .send()
            .await
            .with_context(|| format!("GET directory {path} failed"))?;

        let response = Self::check_status(response, "list directory", path).await?;
        let body: ListDirectoryResponse = response
            .json()
            .await
            .with_context(|| format!("failed to parse listing of {path}"))?;

        let entries = body
            .contents
            .into_iter()
            .map(|e| VolumeEntry {
                name: e.name,
                kind: if e.is_directory {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                },
            })
            .collect();

        Ok(entries)
    }

    /// Downloads a file's full content.
    pub async fn download(&self, path: &VolumePath) -> Result<Vec<u8>> {
        debug!(path = %path, "downloading remote file");

        let response = self
            .request(Method::GET, &Self::api_path(FILES_PREFIX, path))
            .send()
            .await
            .with_context(|| format!("GET file {path} failed"))?;

        let response = Self::check_status(response, "download", path).await?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body of {path}"))?;

        debug!(path = %path, bytes = bytes.len(), "download complete");
        Ok(bytes.to_vec())
    }

    /// Uploads a file's full content, overwriting any existing object.
    pub async fn upload(&self, path: &VolumePath, data: &[u8]) -> Result<()> {
        debug!(path = %path, bytes = data.len(), "uploading file");

        let url_path = format!("{}?overwrite=true", Self::api_path(FILES_PREFIX, path));
        let response = self
            .request(Method::PUT, &url_path)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data.to_vec())
            .send()
            .await
            .with_context(|| format!("PUT file {path} failed"))?;

        Self::check_status(response, "upload", path).await?;
        debug!(path = %path, "upload complete");
        Ok(())
    }

    /// Maps a non-2xx response to an error carrying the status and a body
    /// snippet, so failures are diagnosable from logs alone.
    async fn check_status(
        response: Response,
        operation: &str,
        path: &VolumePath,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        anyhow::bail!("{operation} {path} returned {status}: {snippet}")
    }
}
