//! Volsync Sync - Volume mirroring daemon
//!
//! Provides:
//! - One-shot recursive pull from the remote volume to the local root
//! - A background loop that rescans the local tree and pushes eligible
//!   files back to the volume
//! - Cooperative start/stop lifecycle via cancellation tokens
//!
//! ## Modules
//!
//! - [`daemon`] - The [`SyncDaemon`](daemon::SyncDaemon) itself
//! - [`report`] - Per-operation result aggregation (pull and pass reports)
//! - [`tracker`] - Opt-in content-hash change detection

pub mod daemon;
pub mod report;
pub mod tracker;

use std::path::PathBuf;

use thiserror::Error;

pub use daemon::SyncDaemon;
pub use report::{PassReport, PullReport, SyncFailure};

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// The local root could not be created; the only fatal construction error
    #[error("Local root unavailable at {path}: {source}")]
    LocalRootUnavailable {
        /// The configured local root
        path: PathBuf,
        /// The underlying filesystem fault
        #[source]
        source: std::io::Error,
    },

    /// The configured volume root is not a valid volume path
    #[error("Invalid volume root: {0}")]
    InvalidVolumeRoot(#[from] volsync_core::domain::errors::DomainError),

    /// An I/O error escaped per-file handling (loop-level failure)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
