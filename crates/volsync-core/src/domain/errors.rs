//! Domain error types
//!
//! Validation failures raised when constructing domain newtypes.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote volume path format
    #[error("Invalid volume path: {0}")]
    InvalidVolumePath(String),

    /// Invalid relative path format
    #[error("Invalid relative path: {0}")]
    InvalidRelativePath(String),

    /// A local path does not live under the configured local root
    #[error("Path not within local root: {0}")]
    PathNotInLocalRoot(String),
}
