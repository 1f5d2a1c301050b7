//! Driven port for the client's persisted local state.
//!
//! The state holds `userId`, `createdSessionId`, and `jwt` under those
//! keys. The trait lets the context be backed by a file, memory, or a test
//! double.

use serde::{Deserialize, Serialize};

use super::define_port_error;
use crate::domain::{AuthToken, SessionId, UserId};

/// Everything the client persists between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    /// Acting identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Session created by this client, used for owner gating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_session_id: Option<SessionId>,
    /// Optional bearer credential.
    #[serde(default, rename = "jwt", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<AuthToken>,
}

define_port_error! {
    /// Errors raised while reading or writing client state.
    pub enum ClientStateStoreError {
        /// The backing storage could not be accessed.
        Io { message: String } =>
            "client state storage failed: {message}",
        /// Stored state exists but could not be decoded.
        Corrupt { message: String } =>
            "client state is unreadable: {message}",
    }
}

/// Port for loading and saving [`ClientState`].
#[cfg_attr(test, mockall::automock)]
pub trait ClientStateStore: Send + Sync {
    /// Load the persisted state; absent storage yields the default state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientStateStoreError`] when storage cannot be read.
    fn load(&self) -> Result<ClientState, ClientStateStoreError>;

    /// Replace the persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`ClientStateStoreError`] when storage cannot be written.
    fn save(&self, state: &ClientState) -> Result<(), ClientStateStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_uses_the_browser_storage_keys() {
        let state = ClientState {
            user_id: Some(
                UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("user id"),
            ),
            created_session_id: Some(
                SessionId::new("7fa85f64-5717-4562-b3fc-2c963f66afa6").expect("session id"),
            ),
            auth_token: Some(AuthToken::new("abc").expect("token")),
        };
        let value = serde_json::to_value(&state).expect("encode");
        assert_eq!(
            value,
            serde_json::json!({
                "userId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "createdSessionId": "7fa85f64-5717-4562-b3fc-2c963f66afa6",
                "jwt": "abc",
            })
        );
    }

    #[test]
    fn empty_state_serialises_to_an_empty_object() {
        let value = serde_json::to_value(ClientState::default()).expect("encode");
        assert_eq!(value, serde_json::json!({}));
    }
}
