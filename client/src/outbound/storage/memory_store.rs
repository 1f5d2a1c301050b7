//! Process-local state store.

use std::sync::Mutex;

use crate::domain::ports::{ClientState, ClientStateStore, ClientStateStoreError};

/// [`ClientStateStore`] that keeps state in memory for one process.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: Mutex<ClientState>,
}

impl InMemoryStateStore {
    /// Start from `state` instead of the empty state.
    #[must_use]
    pub const fn with_state(state: ClientState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl ClientStateStore for InMemoryStateStore {
    fn load(&self) -> Result<ClientState, ClientStateStoreError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| ClientStateStoreError::io("in-memory state lock poisoned"))
    }

    fn save(&self, state: &ClientState) -> Result<(), ClientStateStoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| ClientStateStoreError::io("in-memory state lock poisoned"))?;
        guard.clone_from(state);
        Ok(())
    }
}
