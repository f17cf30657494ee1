//! The volume sync daemon
//!
//! [`SyncDaemon`] owns a local directory root and a remote volume root. It
//! performs an initial recursive pull (remote → local), then runs a
//! background loop that periodically rescans the local tree and pushes
//! every eligible file to the corresponding remote path.
//!
//! ## Design
//!
//! - **Best-effort mirror**: a failure at any single entry is recorded in
//!   the report and logged at low severity; siblings and unrelated
//!   subtrees continue. Correctness comes from repetition: the next pass
//!   retries everything.
//! - **Full rescan**: no event-driven change detection. Every pass walks
//!   every regular file under the local root and re-uploads it
//!   unconditionally unless the opt-in change tracker says otherwise.
//! - **Cooperative cancellation**: the loop is controlled by a
//!   `CancellationToken` checked between passes and between files; no
//!   in-flight transfer is forcibly aborted.
//! - **Last-writer-wins by phase**: remote content wins during the pull,
//!   local content wins during each push pass. There is no reconciliation.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use volsync_core::config::SyncConfig;
use volsync_core::domain::newtypes::{RelativePath, VolumePath};
use volsync_core::ports::remote_store::{EntryKind, IRemoteStore};

use crate::report::{PassReport, PullReport};
use crate::tracker::{self, ChangeTracker};
use crate::SyncError;

// ============================================================================
// Background loop handle
// ============================================================================

/// Handle to a running background loop: its token and its task.
struct LoopHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

// ============================================================================
// SyncCore - state shared with the background loop
// ============================================================================

/// Everything a pass needs, shared between the daemon handle and the
/// spawned loop task.
struct SyncCore {
    /// Remote volume operations
    store: Arc<dyn IRemoteStore>,
    /// Local directory owned by this daemon instance
    local_root: PathBuf,
    /// Remote root being mirrored
    volume_root: VolumePath,
    /// Files at or above this many bytes are never uploaded
    max_upload_bytes: u64,
    /// Present only when change detection is enabled
    tracker: Option<Mutex<ChangeTracker>>,
}

impl SyncCore {
    // ========================================================================
    // Initial pull (remote → local)
    // ========================================================================

    /// One-shot recursive copy of the remote tree to disk.
    async fn pull(&self) -> PullReport {
        let started = Instant::now();
        let mut report = PullReport::default();

        if let Err(e) = self.store.create_directory(&self.volume_root).await {
            warn!(volume_root = %self.volume_root, error = %format!("{e:#}"),
                "could not ensure volume root exists, pulling anyway");
            report.record_failure(self.volume_root.as_str(), &e);
        }

        let mut stack = vec![(self.volume_root.clone(), self.local_root.clone())];

        while let Some((volume_dir, local_dir)) = stack.pop() {
            let entries = match self.store.list_directory(&volume_dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(dir = %volume_dir, error = %format!("{e:#}"), "listing failed, pruning subtree");
                    report.record_failure(volume_dir.as_str(), &e);
                    continue;
                }
            };

            for entry in entries {
                let volume_path = match volume_dir.child(&entry.name) {
                    Ok(p) => p,
                    Err(e) => {
                        debug!(dir = %volume_dir, name = %entry.name, "skipping malformed entry name");
                        report.record_failure(
                            format!("{volume_dir}/{}", entry.name),
                            &anyhow::Error::from(e),
                        );
                        continue;
                    }
                };
                let local_path = local_dir.join(&entry.name);

                match entry.kind {
                    EntryKind::Directory => match tokio::fs::create_dir_all(&local_path).await {
                        Ok(()) => {
                            report.dirs_created += 1;
                            stack.push((volume_path, local_path));
                        }
                        Err(e) => {
                            debug!(path = %local_path.display(), error = %e, "directory creation failed");
                            report.record_failure(volume_path.as_str(), &anyhow::Error::from(e));
                        }
                    },
                    EntryKind::File => match self.download_file(&volume_path, &local_path).await {
                        Ok(bytes) => {
                            debug!(path = %volume_path, bytes, "downloaded");
                            report.files_downloaded += 1;
                        }
                        Err(e) => {
                            debug!(path = %volume_path, error = %format!("{e:#}"), "download failed");
                            report.record_failure(volume_path.as_str(), &e);
                        }
                    },
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            downloaded = report.files_downloaded,
            dirs = report.dirs_created,
            failures = report.failures.len(),
            duration_ms = report.duration_ms,
            "initial pull complete"
        );
        report
    }

    /// Downloads one file and writes it via temp-file + rename so a crash
    /// never leaves a partial file behind. Returns the byte count.
    async fn download_file(
        &self,
        volume_path: &VolumePath,
        local_path: &Path,
    ) -> anyhow::Result<usize> {
        let data = self.store.download(volume_path).await?;

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Temp file in the same directory so the rename is atomic.
        let tmp_path = {
            let mut p = local_path.as_os_str().to_owned();
            p.push(".tmp");
            PathBuf::from(p)
        };
        tokio::fs::write(&tmp_path, &data).await?;
        tokio::fs::rename(&tmp_path, local_path).await?;

        Ok(data.len())
    }

    // ========================================================================
    // Push pass (local → remote)
    // ========================================================================

    /// One full walk of the local tree, uploading every eligible file.
    ///
    /// Directory read errors propagate as loop-level errors; per-file read
    /// and upload errors are recorded in the report. The token is checked
    /// between files so `stop()` takes effect mid-pass.
    async fn pass(&self, cancel: &CancellationToken) -> Result<PassReport, SyncError> {
        let started = Instant::now();
        let mut report = PassReport::default();

        let mut stack = vec![self.local_root.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;

            while let Some(entry) = entries.next_entry().await? {
                if cancel.is_cancelled() {
                    debug!("pass cancelled mid-walk, returning partial report");
                    report.duration_ms = started.elapsed().as_millis() as u64;
                    return Ok(report);
                }

                let file_type = entry.file_type().await?;
                let path = entry.path();

                if file_type.is_dir() {
                    stack.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    // Symlinks and special files are not part of the mirror.
                    continue;
                }

                self.push_file(&path, &mut report).await;
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Uploads one regular file, honoring the size ceiling and the opt-in
    /// change tracker. All failures are recorded, never propagated.
    async fn push_file(&self, path: &Path, report: &mut PassReport) {
        let relative = match RelativePath::between(&self.local_root, path) {
            Ok(rel) => rel,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot derive relative path");
                report.record_failure(path.display().to_string(), &anyhow::Error::from(e));
                return;
            }
        };
        let remote_path = self.volume_root.join(&relative);

        let size = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "stat failed");
                report.record_failure(remote_path.as_str(), &anyhow::Error::from(e));
                return;
            }
        };

        if size >= self.max_upload_bytes {
            debug!(path = %relative, size, ceiling = self.max_upload_bytes, "skipping large file");
            report.files_skipped_large += 1;
            return;
        }

        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "read failed");
                report.record_failure(remote_path.as_str(), &anyhow::Error::from(e));
                return;
            }
        };

        let content_digest = self.tracker.as_ref().map(|t| (t, tracker::digest(&data)));
        if let Some((t, d)) = &content_digest {
            let unchanged = t
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .is_unchanged(&relative, d);
            if unchanged {
                debug!(path = %relative, "content unchanged, skipping upload");
                report.files_skipped_unchanged += 1;
                return;
            }
        }

        match self.store.upload(&remote_path, &data).await {
            Ok(()) => {
                debug!(path = %relative, bytes = data.len(), "uploaded");
                report.files_uploaded += 1;
                if let Some((t, d)) = content_digest {
                    t.lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .record(&relative, d);
                }
            }
            Err(e) => {
                debug!(path = %relative, error = %format!("{e:#}"), "upload failed");
                report.record_failure(remote_path.as_str(), &e);
            }
        }
    }

    // ========================================================================
    // Background loop
    // ========================================================================

    /// The background loop: pass, sleep, repeat, until cancelled.
    ///
    /// A pass-level error never terminates the loop; it is logged and
    /// answered with the longer back-off sleep. Both sleeps race the
    /// cancellation token so `stop()` is observed within one interval.
    async fn sync_loop(
        self: Arc<Self>,
        pass_interval: Duration,
        error_backoff: Duration,
        cancel: CancellationToken,
    ) {
        info!(
            interval_ms = pass_interval.as_millis() as u64,
            "sync loop started"
        );

        while !cancel.is_cancelled() {
            let sleep = match self.pass(&cancel).await {
                Ok(report) => {
                    info!(
                        uploaded = report.files_uploaded,
                        skipped_large = report.files_skipped_large,
                        skipped_unchanged = report.files_skipped_unchanged,
                        failures = report.failures.len(),
                        duration_ms = report.duration_ms,
                        "pass complete"
                    );
                    pass_interval
                }
                Err(e) => {
                    warn!(error = %e, "pass failed, backing off");
                    error_backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(sleep) => {}
                _ = cancel.cancelled() => break,
            }
        }

        info!("sync loop stopped");
    }
}

// ============================================================================
// SyncDaemon
// ============================================================================

/// Mirrors files between a local root and a remote volume root.
///
/// Constructed around an [`IRemoteStore`] capability; any store exposing
/// create-directory, list, download, and upload is substitutable, including
/// the disabled no-op variant.
pub struct SyncDaemon {
    /// State shared with the spawned loop task
    core: Arc<SyncCore>,
    /// Sleep between successful passes
    pass_interval: Duration,
    /// Sleep after a pass-level error
    error_backoff: Duration,
    /// Bound on `stop()`'s wait for the loop to finish
    stop_timeout: Duration,
    /// The running background loop, if any
    task: tokio::sync::Mutex<Option<LoopHandle>>,
}

impl SyncDaemon {
    /// Creates a daemon, ensuring the local root exists on disk.
    ///
    /// A filesystem fault while creating the local root is the only fatal
    /// construction error. The volume root is validated but not contacted.
    pub fn new(store: Arc<dyn IRemoteStore>, config: &SyncConfig) -> Result<Self, SyncError> {
        let volume_root = VolumePath::new(config.volume_root.clone())?;

        std::fs::create_dir_all(&config.local_root).map_err(|source| {
            SyncError::LocalRootUnavailable {
                path: config.local_root.clone(),
                source,
            }
        })?;

        info!(
            local_root = %config.local_root.display(),
            volume_root = %volume_root,
            change_detection = config.change_detection,
            "sync daemon initialized"
        );

        Ok(Self {
            core: Arc::new(SyncCore {
                store,
                local_root: config.local_root.clone(),
                volume_root,
                max_upload_bytes: config.max_upload_bytes,
                tracker: config.change_detection.then(|| Mutex::new(ChangeTracker::new())),
            }),
            pass_interval: Duration::from_secs(config.pass_interval_secs),
            error_backoff: Duration::from_secs(config.error_backoff_secs),
            stop_timeout: Duration::from_secs(config.stop_timeout_secs),
            task: tokio::sync::Mutex::new(None),
        })
    }

    /// Overrides the loop timing. Intended for tests that cannot afford
    /// multi-second sleeps.
    #[must_use]
    pub fn with_timing(
        mut self,
        pass_interval: Duration,
        error_backoff: Duration,
        stop_timeout: Duration,
    ) -> Self {
        self.pass_interval = pass_interval;
        self.error_backoff = error_backoff;
        self.stop_timeout = stop_timeout;
        self
    }

    /// The local root this daemon owns.
    #[must_use]
    pub fn local_root(&self) -> &Path {
        &self.core.local_root
    }

    /// The remote root being mirrored.
    #[must_use]
    pub fn volume_root(&self) -> &VolumePath {
        &self.core.volume_root
    }

    /// One-shot, blocking, recursive copy of the remote tree to disk.
    ///
    /// Ensures the volume root exists first; a failure there is recorded
    /// but does not abort the walk. Each directory entry is processed
    /// independently: a listing failure prunes only that subtree, a
    /// download or write failure skips only that file.
    pub async fn pull(&self) -> PullReport {
        self.core.pull().await
    }

    /// Runs a single push pass outside the background loop.
    pub async fn run_pass(&self) -> Result<PassReport, SyncError> {
        self.core.pass(&CancellationToken::new()).await
    }

    /// Starts the background loop. Idempotent: if a loop is already live,
    /// this is a no-op, so two consecutive calls yield exactly one loop.
    pub async fn start(&self) {
        let mut guard = self.task.lock().await;

        if let Some(handle) = guard.as_ref() {
            if !handle.join.is_finished() {
                debug!("sync loop already running, start ignored");
                return;
            }
        }

        let cancel = CancellationToken::new();
        let join = tokio::spawn(Arc::clone(&self.core).sync_loop(
            self.pass_interval,
            self.error_backoff,
            cancel.clone(),
        ));
        *guard = Some(LoopHandle { cancel, join });
        info!("sync daemon started");
    }

    /// Stops the background loop: cancels the token, then waits for the
    /// current pass to finish, bounded by the stop timeout. On timeout the
    /// task is left to drain on its own (best-effort join). A subsequent
    /// [`start`](Self::start) resumes passes.
    pub async fn stop(&self) {
        let handle = self.task.lock().await.take();

        let Some(LoopHandle { cancel, join }) = handle else {
            debug!("stop called with no running loop");
            return;
        };

        cancel.cancel();
        match tokio::time::timeout(self.stop_timeout, join).await {
            Ok(_) => info!("sync daemon stopped"),
            Err(_) => warn!(
                timeout_ms = self.stop_timeout.as_millis() as u64,
                "sync loop did not finish within stop timeout, detaching"
            ),
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
