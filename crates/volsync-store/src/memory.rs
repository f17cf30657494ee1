//! MemoryStore - in-memory IRemoteStore test double
//!
//! Backs the port with a `BTreeMap` so sync behavior can be tested without
//! a network. Supports fault injection for partial-failure tests: listing a
//! marked subtree or downloading a marked file fails while the rest of the
//! tree stays reachable. Upload counts are recorded per path so tests can
//! assert "exactly one loop" properties.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;

use anyhow::Result;

use volsync_core::domain::newtypes::VolumePath;
use volsync_core::ports::remote_store::{EntryKind, IRemoteStore, VolumeEntry};

#[derive(Debug, Default)]
struct Inner {
    /// Full path -> content
    files: BTreeMap<String, Vec<u8>>,
    /// Full paths of directories
    directories: BTreeSet<String>,
    /// Full path -> number of uploads received
    upload_counts: BTreeMap<String, u64>,
    /// Directories whose listing fails
    fail_list: HashSet<String>,
    /// Files whose download fails
    fail_download: HashSet<String>,
    /// Files whose upload fails
    fail_upload: HashSet<String>,
}

/// In-memory remote store with fault injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file, creating parent directories implicitly.
    pub fn insert_file(&self, path: &str, data: impl Into<Vec<u8>>) {
        let mut inner = self.inner.lock().expect("memory store lock");
        Self::add_parents(&mut inner.directories, path);
        inner.files.insert(path.to_string(), data.into());
    }

    /// Seeds an empty directory.
    pub fn insert_directory(&self, path: &str) {
        let mut inner = self.inner.lock().expect("memory store lock");
        Self::add_parents(&mut inner.directories, path);
        inner.directories.insert(path.to_string());
    }

    /// Marks a directory so listing it fails.
    pub fn fail_list_under(&self, path: &str) {
        let mut inner = self.inner.lock().expect("memory store lock");
        inner.fail_list.insert(path.to_string());
    }

    /// Marks a file so downloading it fails.
    pub fn fail_download_of(&self, path: &str) {
        let mut inner = self.inner.lock().expect("memory store lock");
        inner.fail_download.insert(path.to_string());
    }

    /// Marks a file so uploading it fails.
    pub fn fail_upload_of(&self, path: &str) {
        let mut inner = self.inner.lock().expect("memory store lock");
        inner.fail_upload.insert(path.to_string());
    }

    /// Returns a file's content, if present.
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().expect("memory store lock");
        inner.files.get(path).cloned()
    }

    /// Returns whether a directory exists.
    pub fn has_directory(&self, path: &str) -> bool {
        let inner = self.inner.lock().expect("memory store lock");
        inner.directories.contains(path)
    }

    /// Number of uploads received for one path.
    pub fn upload_count(&self, path: &str) -> u64 {
        let inner = self.inner.lock().expect("memory store lock");
        inner.upload_counts.get(path).copied().unwrap_or(0)
    }

    /// Total uploads received across all paths.
    pub fn total_uploads(&self) -> u64 {
        let inner = self.inner.lock().expect("memory store lock");
        inner.upload_counts.values().sum()
    }

    /// All stored file paths, sorted.
    pub fn file_paths(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("memory store lock");
        inner.files.keys().cloned().collect()
    }

    fn add_parents(directories: &mut BTreeSet<String>, path: &str) {
        let mut current = String::new();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        // Everything above the leaf is a directory.
        for segment in &segments[..segments.len().saturating_sub(1)] {
            current.push('/');
            current.push_str(segment);
            directories.insert(current.clone());
        }
    }

    /// Immediate children of `dir`: name plus kind.
    fn children_of(inner: &Inner, dir: &str) -> Vec<VolumeEntry> {
        let prefix = if dir == "/" {
            "/".to_string()
        } else {
            format!("{dir}/")
        };

        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();

        for path in inner.directories.iter() {
            if let Some(rest) = path.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') && seen.insert(rest.to_string()) {
                    entries.push(VolumeEntry::directory(rest));
                }
            }
        }
        for path in inner.files.keys() {
            if let Some(rest) = path.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') && seen.insert(rest.to_string()) {
                    entries.push(VolumeEntry::file(rest));
                }
            }
        }

        entries
    }
}

#[async_trait::async_trait]
impl IRemoteStore for MemoryStore {
    async fn create_directory(&self, path: &VolumePath) -> Result<()> {
        let mut inner = self.inner.lock().expect("memory store lock");
        Self::add_parents(&mut inner.directories, path.as_str());
        inner.directories.insert(path.as_str().to_string());
        Ok(())
    }

    async fn list_directory(&self, path: &VolumePath) -> Result<Vec<VolumeEntry>> {
        let inner = self.inner.lock().expect("memory store lock");
        if inner.fail_list.contains(path.as_str()) {
            anyhow::bail!("injected listing failure for {path}");
        }
        if !inner.directories.contains(path.as_str()) && path.as_str() != "/" {
            anyhow::bail!("no such directory: {path}");
        }
        Ok(Self::children_of(&inner, path.as_str()))
    }

    async fn download(&self, path: &VolumePath) -> Result<Vec<u8>> {
        let inner = self.inner.lock().expect("memory store lock");
        if inner.fail_download.contains(path.as_str()) {
            anyhow::bail!("injected download failure for {path}");
        }
        inner
            .files
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file: {path}"))
    }

    async fn upload(&self, path: &VolumePath, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().expect("memory store lock");
        if inner.fail_upload.contains(path.as_str()) {
            anyhow::bail!("injected upload failure for {path}");
        }
        let key = path.as_str().to_string();
        Self::add_parents(&mut inner.directories, &key);
        inner.files.insert(key.clone(), data.to_vec());
        *inner.upload_counts.entry(key).or_insert(0) += 1;
        Ok(())
    }
}
