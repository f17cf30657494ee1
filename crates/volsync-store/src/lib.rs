//! Volsync Store - Remote volume store adapters
//!
//! Implementations of the [`IRemoteStore`](volsync_core::ports::IRemoteStore)
//! port:
//!
//! - [`http::HttpRemoteStore`] - the real adapter, speaking a Files-API-style
//!   REST surface over HTTPS
//! - [`disabled::DisabledStore`] - the no-op variant selected when no store
//!   credentials are configured; the rest of the system never branches on
//!   availability
//! - [`memory::MemoryStore`] - an in-memory store with fault injection,
//!   used as a test double by the sync crate
//!
//! ## Modules
//!
//! - [`client`] - Typed HTTP client (auth headers, endpoint construction)
//! - [`http`] - `IRemoteStore` over [`client::FilesClient`]

pub mod client;
pub mod disabled;
pub mod http;
pub mod memory;

pub use disabled::DisabledStore;
pub use http::HttpRemoteStore;
pub use memory::MemoryStore;
