//! Volsync Core - Domain logic and port definitions
//!
//! This crate contains the hexagonal core of volsync:
//! - **Domain newtypes** - `VolumePath`, `RelativePath`
//! - **Port definitions** - `IRemoteStore`, the capability interface every
//!   remote store adapter implements
//! - **Configuration** - typed config with YAML loading, defaults,
//!   validation, and environment overrides
//!
//! No I/O happens here beyond config file reading; adapters live in
//! `volsync-store`, orchestration in `volsync-sync`.

pub mod config;
pub mod domain;
pub mod ports;
