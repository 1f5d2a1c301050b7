//! Domain ports for the hexagonal boundary.
//!
//! The flows depend only on these traits. The reqwest adapter, the
//! in-memory backend, the state stores, and the test doubles implement them.

mod macros;
pub(crate) use macros::define_port_error;

mod client_state_store;
mod credentials;
mod sessions_api;
mod users_api;

#[cfg(test)]
pub use client_state_store::MockClientStateStore;
pub use client_state_store::{ClientState, ClientStateStore, ClientStateStoreError};
pub use credentials::{CredentialSource, NoCredentials};
#[cfg(test)]
pub use sessions_api::MockSessionsApi;
pub use sessions_api::SessionsApi;
#[cfg(test)]
pub use users_api::MockUsersApi;
pub use users_api::UsersApi;
