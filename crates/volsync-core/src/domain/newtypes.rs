//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for the two path namespaces the daemon bridges.
//! Each newtype ensures validity at construction time, so the sync code
//! never has to re-check path shape at the point of use.
//!
//! The mapping invariant lives here: a file's remote identity is always
//! `volume_root.join(relative)`, and `relative` is always derived from the
//! file's location under the local root. Remote paths are `/`-separated
//! regardless of the host OS separator.

use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// VolumePath
// ============================================================================

/// Absolute path of an object in the remote volume namespace.
///
/// Invariants: non-empty, starts with `/`, no `..` segments, no empty
/// segments (`//`), no NUL bytes, no trailing slash (except the root `/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumePath(String);

impl VolumePath {
    /// Create a new `VolumePath`, validating its shape.
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let mut path = path.into();

        if path.is_empty() {
            return Err(DomainError::InvalidVolumePath(
                "path must not be empty".to_string(),
            ));
        }
        if !path.starts_with('/') {
            return Err(DomainError::InvalidVolumePath(format!(
                "path must be absolute: {path}"
            )));
        }
        if path.contains('\0') {
            return Err(DomainError::InvalidVolumePath(
                "path contains NUL byte".to_string(),
            ));
        }

        // Normalize a trailing slash away so joins stay canonical.
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }

        for segment in path.split('/').skip(1) {
            if segment.is_empty() && path != "/" {
                return Err(DomainError::InvalidVolumePath(format!(
                    "path contains empty segment: {path}"
                )));
            }
            if segment == ".." {
                return Err(DomainError::InvalidVolumePath(format!(
                    "path contains parent traversal: {path}"
                )));
            }
        }

        Ok(Self(path))
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a single entry name, as reported by a store listing.
    ///
    /// Entry names come from the remote listing API and must be bare names
    /// (no separators, no traversal).
    pub fn child(&self, name: &str) -> Result<Self, DomainError> {
        if name.is_empty() || name.contains('/') || name == ".." || name.contains('\0') {
            return Err(DomainError::InvalidVolumePath(format!(
                "invalid entry name: {name}"
            )));
        }
        if self.0 == "/" {
            Self::new(format!("/{name}"))
        } else {
            Self::new(format!("{}/{name}", self.0))
        }
    }

    /// Resolve a [`RelativePath`] against this path.
    ///
    /// This is the core mapping: `volume_root.join(rel)` is the remote
    /// identity of the local file at `local_root/rel`.
    #[must_use]
    pub fn join(&self, relative: &RelativePath) -> Self {
        if self.0 == "/" {
            Self(format!("/{}", relative.as_str()))
        } else {
            Self(format!("{}/{}", self.0, relative.as_str()))
        }
    }
}

impl Display for VolumePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VolumePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VolumePath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ============================================================================
// RelativePath
// ============================================================================

/// The mapping key between the local and remote namespaces.
///
/// Always `/`-separated, never absolute, never traversing upward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    /// Create a new `RelativePath`, validating its shape.
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();

        if path.is_empty() {
            return Err(DomainError::InvalidRelativePath(
                "path must not be empty".to_string(),
            ));
        }
        if path.starts_with('/') {
            return Err(DomainError::InvalidRelativePath(format!(
                "path must be relative: {path}"
            )));
        }
        if path.contains('\0') {
            return Err(DomainError::InvalidRelativePath(
                "path contains NUL byte".to_string(),
            ));
        }
        for segment in path.split('/') {
            if segment.is_empty() {
                return Err(DomainError::InvalidRelativePath(format!(
                    "path contains empty segment: {path}"
                )));
            }
            if segment == ".." {
                return Err(DomainError::InvalidRelativePath(format!(
                    "path contains parent traversal: {path}"
                )));
            }
        }

        Ok(Self(path))
    }

    /// Derive the relative path of `path` under `root`.
    ///
    /// OS separators are normalized to `/` so the result is a valid remote
    /// path fragment on every platform.
    pub fn between(root: &Path, path: &Path) -> Result<Self, DomainError> {
        let stripped = path
            .strip_prefix(root)
            .map_err(|_| DomainError::PathNotInLocalRoot(path.display().to_string()))?;

        let mut parts = Vec::new();
        for component in stripped.components() {
            match component {
                std::path::Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        DomainError::InvalidRelativePath(format!(
                            "non-UTF-8 path component in {}",
                            path.display()
                        ))
                    })?;
                    parts.push(part);
                }
                _ => {
                    return Err(DomainError::InvalidRelativePath(format!(
                        "unexpected path component in {}",
                        path.display()
                    )))
                }
            }
        }

        Self::new(parts.join("/"))
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RelativePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RelativePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
