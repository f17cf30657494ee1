//! Sync operation reports
//!
//! Every per-entry step of a pull or a push pass returns a result, and the
//! walk aggregates those results here instead of suppressing them. The
//! caller can distinguish "nothing to sync" from "everything failed"
//! without grepping logs.

/// A single non-fatal failure recorded during a pull or pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    /// The remote or local path the failure relates to
    pub path: String,
    /// Rendered error chain
    pub error: String,
}

/// Summary of a completed initial pull (remote → local).
#[derive(Debug, Clone, Default)]
pub struct PullReport {
    /// Number of files downloaded and written locally
    pub files_downloaded: u32,
    /// Number of local directories ensured to exist
    pub dirs_created: u32,
    /// Non-fatal failures; each pruned at most one entry or subtree
    pub failures: Vec<SyncFailure>,
    /// Wall-clock duration of the pull in milliseconds
    pub duration_ms: u64,
}

impl PullReport {
    /// Records a per-entry failure without aborting the walk.
    pub fn record_failure(&mut self, path: impl Into<String>, error: &anyhow::Error) {
        self.failures.push(SyncFailure {
            path: path.into(),
            error: format!("{error:#}"),
        });
    }

    /// True when every entry was processed successfully.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Summary of one background push pass (local → remote).
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Number of files uploaded
    pub files_uploaded: u32,
    /// Files skipped because they are at or above the size ceiling
    pub files_skipped_large: u32,
    /// Files skipped by the opt-in change tracker
    pub files_skipped_unchanged: u32,
    /// Non-fatal per-file failures
    pub failures: Vec<SyncFailure>,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl PassReport {
    /// Records a per-file failure without aborting the pass.
    pub fn record_failure(&mut self, path: impl Into<String>, error: &anyhow::Error) {
        self.failures.push(SyncFailure {
            path: path.into(),
            error: format!("{error:#}"),
        });
    }

    /// True when every eligible file was uploaded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
