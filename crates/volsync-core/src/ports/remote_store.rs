//! Remote store port (driven/secondary port)
//!
//! Defines the interface for the external hierarchical file store the daemon
//! mirrors against. The primary implementation speaks a Files-API-style REST
//! surface, but the trait is store-agnostic: any backend exposing these four
//! operations is substitutable, including the no-op variant used when no
//! credentials are configured.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - Listings carry only a name and a type tag. The store reports no size,
//!   hash, or modification time; the listing is the only source of truth.

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::VolumePath;

// ============================================================================
// Listing DTOs
// ============================================================================

/// Type tag for a remote directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// A regular file
    File,
    /// A directory
    Directory,
}

/// A single entry from a remote directory listing.
///
/// This is a port-level DTO, not a domain entity; the sync engine decides
/// what to do with each entry based on its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeEntry {
    /// Entry name (file or directory name, no separators)
    pub name: String,
    /// Whether the entry is a file or a directory
    pub kind: EntryKind,
}

impl VolumeEntry {
    /// Convenience constructor for a file entry.
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// Convenience constructor for a directory entry.
    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for remote volume operations.
///
/// All four operations are whole-object: no partial reads, no chunked or
/// resumable uploads. That matches the daemon's best-effort full-rescan
/// design; size policy (which files are eligible for upload at all) is the
/// caller's concern.
///
/// ## Implementation Notes
///
/// - `create_directory` must be idempotent: creating a directory that
///   already exists is a success.
/// - `upload` overwrites unconditionally; there is no compare-and-swap.
/// - Implementations should not retry internally; the sync loop's periodic
///   rescan is the retry mechanism.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Creates a directory (and any missing parents) if absent.
    async fn create_directory(&self, path: &VolumePath) -> anyhow::Result<()>;

    /// Lists the immediate children of a directory.
    ///
    /// Returns an empty vector for an empty directory. A missing directory
    /// is an error, not an empty listing.
    async fn list_directory(&self, path: &VolumePath) -> anyhow::Result<Vec<VolumeEntry>>;

    /// Downloads a file's full content.
    async fn download(&self, path: &VolumePath) -> anyhow::Result<Vec<u8>>;

    /// Uploads a file's full content, overwriting any existing object.
    async fn upload(&self, path: &VolumePath, data: &[u8]) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_constructors() {
        let f = VolumeEntry::file("notes.txt");
        assert_eq!(f.name, "notes.txt");
        assert_eq!(f.kind, EntryKind::File);

        let d = VolumeEntry::directory("cfg");
        assert_eq!(d.name, "cfg");
        assert_eq!(d.kind, EntryKind::Directory);
    }
}
