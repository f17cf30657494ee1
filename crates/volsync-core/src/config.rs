//! Configuration module for volsync.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, defaults, and environment-variable
//! overrides applied by the daemon binary at startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Upload size ceiling: files at or above this many bytes are skipped.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for volsync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Local scratch directory the daemon owns and mirrors into.
    pub local_root: PathBuf,
    /// Remote volume path being mirrored.
    pub volume_root: String,
    /// Seconds between background push passes.
    pub pass_interval_secs: u64,
    /// Seconds to back off after a pass-level error.
    pub error_backoff_secs: u64,
    /// Seconds `stop()` waits for the loop to finish its current pass.
    pub stop_timeout_secs: u64,
    /// Files at or above this many bytes are never uploaded.
    pub max_upload_bytes: u64,
    /// Skip re-uploading files whose content hash is unchanged since the
    /// last successful upload in this process. Off by default: every pass
    /// re-uploads every eligible file.
    pub change_detection: bool,
}

/// Remote store connection settings.
///
/// When either field is absent, sync is disabled for the process lifetime
/// and the daemon runs against the no-op store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the store's REST API, e.g. `https://workspace.example.com`.
    pub base_url: Option<String>,
    /// Bearer token for API authentication.
    pub token: Option<String>,
}

/// Foreground server subprocess settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Command and arguments to launch. Empty means daemon-only mode.
    pub command: Vec<String>,
    /// Bind address passed to the server as `--host`.
    pub host: String,
    /// Port passed to the server as `--port`.
    pub port: u16,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/volsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("volsync")
            .join("config.yaml")
    }

    /// Apply environment-variable overrides on top of the loaded file.
    ///
    /// Recognized variables:
    /// - `VOLSYNC_TRACKING_URI`: a `sqlite:///<file>` URI; when present, the
    ///   volume root becomes the parent directory of `<file>`.
    /// - `VOLSYNC_VOLUME_ROOT`, `VOLSYNC_LOCAL_ROOT`
    /// - `VOLSYNC_STORE_URL`, `VOLSYNC_STORE_TOKEN`
    pub fn apply_env(&mut self) {
        if let Ok(uri) = std::env::var("VOLSYNC_TRACKING_URI") {
            if let Some(root) = volume_root_from_tracking_uri(&uri) {
                self.sync.volume_root = root;
            }
        }
        if let Ok(root) = std::env::var("VOLSYNC_VOLUME_ROOT") {
            if !root.is_empty() {
                self.sync.volume_root = root;
            }
        }
        if let Ok(root) = std::env::var("VOLSYNC_LOCAL_ROOT") {
            if !root.is_empty() {
                self.sync.local_root = PathBuf::from(root);
            }
        }
        if let Ok(url) = std::env::var("VOLSYNC_STORE_URL") {
            if !url.is_empty() {
                self.store.base_url = Some(url);
            }
        }
        if let Ok(token) = std::env::var("VOLSYNC_STORE_TOKEN") {
            if !token.is_empty() {
                self.store.token = Some(token);
            }
        }
    }
}

/// Derive a volume root from a `sqlite:///<file>` tracking URI.
///
/// The volume root is the directory containing the database file; other URI
/// schemes yield no override.
pub fn volume_root_from_tracking_uri(uri: &str) -> Option<String> {
    let file = uri.strip_prefix("sqlite:///")?;
    // strip_prefix removes the third slash as well, so restore absoluteness.
    let file = format!("/{}", file.trim_start_matches('/'));
    let parent = Path::new(&file).parent()?;
    let parent = parent.to_str()?;
    if parent.is_empty() || parent == "/" {
        return None;
    }
    Some(parent.to_string())
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

// Config and StoreConfig derive Default because all their fields do.

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            local_root: PathBuf::from("/tmp/volsync-data"),
            volume_root: "/Volumes/shared/volsync".to_string(),
            pass_interval_secs: 5,
            error_backoff_secs: 10,
            stop_timeout_secs: 2,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            change_detection: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.pass_interval_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.sync.pass_interval_secs == 0 {
            errors.push(ValidationError {
                field: "sync.pass_interval_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.error_backoff_secs == 0 {
            errors.push(ValidationError {
                field: "sync.error_backoff_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.max_upload_bytes == 0 {
            errors.push(ValidationError {
                field: "sync.max_upload_bytes".into(),
                message: "must be greater than 0".into(),
            });
        }
        if !self.sync.volume_root.starts_with('/') {
            errors.push(ValidationError {
                field: "sync.volume_root".into(),
                message: "must be an absolute volume path".into(),
            });
        }
        if self.store.base_url.is_some() != self.store.token.is_some() {
            errors.push(ValidationError {
                field: "store".into(),
                message: "base_url and token must be set together".into(),
            });
        }
        if self.server.port == 0 {
            errors.push(ValidationError {
                field: "server.port".into(),
                message: "must be a valid TCP port".into(),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.sync.pass_interval_secs, 5);
        assert_eq!(config.sync.error_backoff_secs, 10);
        assert_eq!(config.sync.stop_timeout_secs, 2);
        assert_eq!(config.sync.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!config.sync.change_detection);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.sync.pass_interval_secs = 0;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "sync.pass_interval_secs"));
    }

    #[test]
    fn test_validate_rejects_relative_volume_root() {
        let mut config = Config::default();
        config.sync.volume_root = "relative/path".into();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "sync.volume_root"));
    }

    #[test]
    fn test_validate_rejects_partial_store_credentials() {
        let mut config = Config::default();
        config.store.base_url = Some("https://example.com".into());
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "store"));
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "sync:\n  volume_root: /Volumes/team/data\n  pass_interval_secs: 7\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.sync.volume_root, "/Volumes/team/data");
        assert_eq!(config.sync.pass_interval_secs, 7);
        // Unspecified sections keep their defaults.
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/volsync.yaml"));
        assert_eq!(config.sync.pass_interval_secs, 5);
    }

    #[test]
    fn test_tracking_uri_derivation() {
        assert_eq!(
            volume_root_from_tracking_uri("sqlite:////Volumes/team/data/tracking.db"),
            Some("/Volumes/team/data".to_string())
        );
        assert_eq!(
            volume_root_from_tracking_uri("sqlite:///Volumes/team/data/tracking.db"),
            Some("/Volumes/team/data".to_string())
        );
        assert_eq!(volume_root_from_tracking_uri("postgres://host/db"), None);
        assert_eq!(volume_root_from_tracking_uri("sqlite:///top.db"), None);
    }

    #[test]
    fn test_default_path_is_nonempty() {
        assert!(!Config::default_path().as_os_str().is_empty());
    }
}
