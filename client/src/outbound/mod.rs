//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest client for the lunch backend
//! - **storage**: client state file and its in-memory twin
//! - **memory**: in-process backend for tests (`test-support` feature)
//!
//! Adapters are thin translators between domain types and wire or storage
//! representations. They contain no flow logic.

pub mod http;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod storage;
