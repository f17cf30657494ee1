//! Integration tests for the Files API store adapter.
//!
//! Run with: cargo test -p volsync-store --test integration

mod common;
mod test_store_operations;
