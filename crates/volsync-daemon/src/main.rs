//! volsyncd - host process for the volume sync daemon
//!
//! Bootstraps the mirroring daemon and supervises an optional foreground
//! server subprocess:
//! - Resolves configuration (YAML file, then environment overrides)
//! - Selects a remote store: the HTTP adapter when credentials are
//!   configured, otherwise the no-op disabled store
//! - Runs the blocking initial pull, then starts the background loop
//! - Launches the configured server command and waits on it
//! - Graceful shutdown on SIGTERM/SIGINT: stop the daemon, kill the child
//!
//! Sync failures are surfaced only through logs and never change the exit
//! code; the host's primary responsibility is serving. A server spawn
//! failure or non-zero server exit does fail the process.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use volsync_core::config::Config;
use volsync_core::ports::IRemoteStore;
use volsync_store::{DisabledStore, HttpRemoteStore};
use volsync_sync::SyncDaemon;

// ============================================================================
// Store selection
// ============================================================================

/// Picks the remote store capability at construction time.
///
/// With both a base URL and a token configured, the real HTTP adapter is
/// used. Anything less disables sync for the process lifetime; the rest of
/// the program is oblivious to the difference.
fn select_store(config: &Config) -> Arc<dyn IRemoteStore> {
    match (&config.store.base_url, &config.store.token) {
        (Some(base_url), Some(token)) => {
            info!(base_url = %base_url, "using HTTP remote store");
            Arc::new(HttpRemoteStore::new(base_url.clone(), token.clone()))
        }
        _ => Arc::new(DisabledStore::new()),
    }
}

// ============================================================================
// Server subprocess
// ============================================================================

/// Spawns the configured server command with `--host`/`--port` appended.
fn spawn_server(config: &Config) -> Result<tokio::process::Child> {
    let command = &config.server.command;
    let (program, args) = command
        .split_first()
        .context("server.command must not be empty")?;

    info!(
        program = %program,
        host = %config.server.host,
        port = config.server.port,
        "starting server"
    );

    tokio::process::Command::new(program)
        .args(args)
        .arg("--host")
        .arg(&config.server.host)
        .arg("--port")
        .arg(config.server.port.to_string())
        .spawn()
        .with_context(|| format!("failed to spawn server command {program}"))
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!("volsyncd starting");

    // Resolve configuration: file first, then environment overrides.
    let config_path = Config::default_path();
    let mut config = Config::load_or_default(&config_path);
    config.apply_env();

    for issue in config.validate() {
        warn!(field = %issue.field, message = %issue.message, "configuration issue");
    }

    info!(
        config_path = %config_path.display(),
        local_root = %config.sync.local_root.display(),
        volume_root = %config.sync.volume_root,
        "configuration resolved"
    );

    // Construct the daemon. A local filesystem fault here is the only
    // condition that stops the host.
    let store = select_store(&config);
    let daemon = Arc::new(
        SyncDaemon::new(store, &config.sync).context("failed to initialize sync daemon")?,
    );

    // Blocking initial pull, then the background loop.
    let report = daemon.pull().await;
    if !report.is_clean() {
        warn!(
            failures = report.failures.len(),
            downloaded = report.files_downloaded,
            "initial pull finished with failures"
        );
    }
    daemon.start().await;

    // Shutdown plumbing.
    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let result = supervise(&config, &daemon, &shutdown_token).await;

    daemon.stop().await;

    match &result {
        Ok(()) => info!("volsyncd shut down gracefully"),
        Err(e) => error!(error = %format!("{e:#}"), "volsyncd exiting with error"),
    }

    result
}

/// Runs the foreground side: either supervises the server subprocess or,
/// in daemon-only mode, parks until a shutdown signal arrives.
async fn supervise(
    config: &Config,
    daemon: &Arc<SyncDaemon>,
    shutdown: &CancellationToken,
) -> Result<()> {
    if config.server.command.is_empty() {
        info!("no server command configured, running in daemon-only mode");
        shutdown.cancelled().await;
        return Ok(());
    }

    let mut child = spawn_server(config)?;

    tokio::select! {
        status = child.wait() => {
            let status = status.context("failed to wait on server process")?;
            // The server ending on its own is the end of the host's job;
            // stop mirroring before reporting the outcome.
            daemon.stop().await;
            if status.success() {
                info!("server exited cleanly");
                Ok(())
            } else {
                anyhow::bail!("server exited with {status}")
            }
        }
        _ = shutdown.cancelled() => {
            info!("shutting down server");
            if let Err(e) = child.start_kill() {
                warn!(error = %e, "failed to signal server process");
            }
            let _ = child.wait().await;
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_store_disabled_without_credentials() {
        let config = Config::default();
        // Just verify the disabled path is taken without panicking; the
        // returned trait object behaves as an empty remote.
        let store = select_store(&config);
        let root = volsync_core::domain::newtypes::VolumePath::new("/vol").unwrap();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let entries = rt.block_on(store.list_directory(&root)).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_spawn_server_rejects_empty_command() {
        let config = Config::default();
        assert!(spawn_server(&config).is_err());
    }

    #[test]
    fn test_cancellation_token_propagation() {
        let parent = CancellationToken::new();
        let child = parent.child_token();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
