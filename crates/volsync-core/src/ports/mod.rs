//! Port definitions (hexagonal architecture)
//!
//! Ports are trait interfaces that the core depends on; adapters in other
//! crates implement them. `volsync` has a single driven port: the remote
//! store.

pub mod remote_store;

pub use remote_store::{EntryKind, IRemoteStore, VolumeEntry};
