//! HttpRemoteStore - IRemoteStore implementation over the Files API
//!
//! Thin adapter that delegates each port operation to [`FilesClient`].
//! No retry logic lives here; the sync loop's periodic rescan is the
//! retry mechanism.

use anyhow::Result;

use volsync_core::domain::newtypes::VolumePath;
use volsync_core::ports::remote_store::{IRemoteStore, VolumeEntry};

use crate::client::FilesClient;

/// The real remote store adapter, speaking HTTPS to the volume's Files API.
pub struct HttpRemoteStore {
    client: FilesClient,
}

impl HttpRemoteStore {
    /// Creates a store adapter from workspace credentials.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: FilesClient::new(base_url, token),
        }
    }

    /// Wraps an existing [`FilesClient`].
    pub fn from_client(client: FilesClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl IRemoteStore for HttpRemoteStore {
    async fn create_directory(&self, path: &VolumePath) -> Result<()> {
        self.client.create_directory(path).await
    }

    async fn list_directory(&self, path: &VolumePath) -> Result<Vec<VolumeEntry>> {
        self.client.list_directory(path).await
    }

    async fn download(&self, path: &VolumePath) -> Result<Vec<u8>> {
        self.client.download(path).await
    }

    async fn upload(&self, path: &VolumePath, data: &[u8]) -> Result<()> {
        self.client.upload(path, data).await
    }
}
