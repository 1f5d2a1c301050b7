//! JSON state file in a capability-scoped directory.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::ports::{ClientState, ClientStateStore, ClientStateStoreError};

/// File name of the persisted state inside the state directory.
pub const STATE_FILE_NAME: &str = "client-state.json";

/// [`ClientStateStore`] backed by `client-state.json` in one directory.
#[derive(Debug)]
pub struct FileStateStore {
    dir: Dir,
    location: Utf8PathBuf,
}

impl FileStateStore {
    /// Open `state_dir`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ClientStateStoreError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open(state_dir: &Utf8Path) -> Result<Self, ClientStateStoreError> {
        Dir::create_ambient_dir_all(state_dir, ambient_authority()).map_err(|err| {
            ClientStateStoreError::io(format!("creating {state_dir}: {err}"))
        })?;
        let dir = Dir::open_ambient_dir(state_dir, ambient_authority())
            .map_err(|err| ClientStateStoreError::io(format!("opening {state_dir}: {err}")))?;
        Ok(Self {
            dir,
            location: state_dir.join(STATE_FILE_NAME),
        })
    }

    /// Full path of the state file, for diagnostics.
    #[must_use]
    pub fn location(&self) -> &Utf8Path {
        &self.location
    }
}

impl ClientStateStore for FileStateStore {
    fn load(&self) -> Result<ClientState, ClientStateStoreError> {
        let raw = match self.dir.read_to_string(STATE_FILE_NAME) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.location, "no state file yet");
                return Ok(ClientState::default());
            }
            Err(err) => {
                return Err(ClientStateStoreError::io(format!(
                    "reading {}: {err}",
                    self.location
                )));
            }
        };
        if raw.trim().is_empty() {
            return Ok(ClientState::default());
        }
        serde_json::from_str(&raw).map_err(|err| {
            ClientStateStoreError::corrupt(format!("{}: {err}", self.location))
        })
    }

    fn save(&self, state: &ClientState) -> Result<(), ClientStateStoreError> {
        let encoded = serde_json::to_string_pretty(state)
            .map_err(|err| ClientStateStoreError::io(format!("encoding state: {err}")))?;
        write_atomic(&self.dir, Utf8Path::new(STATE_FILE_NAME), &encoded)?;
        debug!(path = %self.location, "state file written");
        Ok(())
    }
}
