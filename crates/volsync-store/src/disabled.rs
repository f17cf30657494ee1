//! DisabledStore - no-op IRemoteStore variant
//!
//! Selected at construction time when no store credentials are configured.
//! This is a permanent feature-disable for the process lifetime, not a
//! retryable condition: the daemon runs, passes complete, nothing is
//! transferred. The rest of the system never branches on availability.

use anyhow::Result;
use tracing::{debug, warn};

use volsync_core::domain::newtypes::VolumePath;
use volsync_core::ports::remote_store::{IRemoteStore, VolumeEntry};

/// A remote store that accepts writes and reports an empty remote tree.
///
/// `download` is unreachable through the daemon because listings are always
/// empty; calling it directly is an error.
#[derive(Debug, Clone, Default)]
pub struct DisabledStore;

impl DisabledStore {
    /// Creates a disabled store, logging the fact once.
    #[must_use]
    pub fn new() -> Self {
        warn!("remote store credentials not configured, sync is disabled for this process");
        Self
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DisabledStore {
    async fn create_directory(&self, path: &VolumePath) -> Result<()> {
        debug!(path = %path, "disabled store: create_directory ignored");
        Ok(())
    }

    async fn list_directory(&self, path: &VolumePath) -> Result<Vec<VolumeEntry>> {
        debug!(path = %path, "disabled store: empty listing");
        Ok(Vec::new())
    }

    async fn download(&self, path: &VolumePath) -> Result<Vec<u8>> {
        anyhow::bail!("remote store is disabled, cannot download {path}")
    }

    async fn upload(&self, path: &VolumePath, _data: &[u8]) -> Result<()> {
        debug!(path = %path, "disabled store: upload ignored");
        Ok(())
    }
}
