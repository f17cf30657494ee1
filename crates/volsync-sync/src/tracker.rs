//! Change tracker - opt-in upload deduplication
//!
//! The daemon's baseline behavior re-uploads every eligible file on every
//! pass; correctness comes from repetition, not change detection. This
//! module is the explicit, separately-tested optimization layered on top:
//! an in-memory map of content digests recorded after each successful
//! upload. Nothing is persisted, so a process restart re-uploads
//! everything once, exactly like the baseline.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use volsync_core::domain::newtypes::RelativePath;

/// SHA-256 digest of a file's content.
pub type ContentDigest = [u8; 32];

/// Computes the content digest used by the tracker.
#[must_use]
pub fn digest(data: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Tracks the last successfully uploaded digest per relative path.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    digests: HashMap<String, ContentDigest>,
}

impl ChangeTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the file's content matches its last successful
    /// upload in this process.
    #[must_use]
    pub fn is_unchanged(&self, path: &RelativePath, digest: &ContentDigest) -> bool {
        self.digests.get(path.as_str()) == Some(digest)
    }

    /// Records a successful upload. Only called after the store accepted
    /// the bytes, so a failed upload is always retried next pass.
    pub fn record(&mut self, path: &RelativePath, digest: ContentDigest) {
        self.digests.insert(path.as_str().to_string(), digest);
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// True when nothing has been tracked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(s: &str) -> RelativePath {
        RelativePath::new(s).unwrap()
    }

    #[test]
    fn test_untracked_path_is_changed() {
        let tracker = ChangeTracker::new();
        assert!(!tracker.is_unchanged(&rel("a.txt"), &digest(b"content")));
    }

    #[test]
    fn test_recorded_digest_is_unchanged() {
        let mut tracker = ChangeTracker::new();
        let d = digest(b"content");
        tracker.record(&rel("a.txt"), d);
        assert!(tracker.is_unchanged(&rel("a.txt"), &d));
    }

    #[test]
    fn test_modified_content_is_changed() {
        let mut tracker = ChangeTracker::new();
        tracker.record(&rel("a.txt"), digest(b"v1"));
        assert!(!tracker.is_unchanged(&rel("a.txt"), &digest(b"v2")));
    }

    #[test]
    fn test_paths_are_independent() {
        let mut tracker = ChangeTracker::new();
        let d = digest(b"same bytes");
        tracker.record(&rel("a.txt"), d);
        assert!(!tracker.is_unchanged(&rel("b.txt"), &d));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(digest(b"x"), digest(b"x"));
        assert_ne!(digest(b"x"), digest(b"y"));
    }
}
