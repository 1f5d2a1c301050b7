//! Client state persistence adapters.

mod atomic_io;
mod file_store;
mod memory_store;

pub use file_store::{FileStateStore, STATE_FILE_NAME};
pub use memory_store::InMemoryStateStore;
