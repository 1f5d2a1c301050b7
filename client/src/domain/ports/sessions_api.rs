//! Driven port for the backend's session endpoints.
//!
//! Every mutating call names the acting user explicitly; the backend, not
//! the client, decides whether that user may perform the action.

use async_trait::async_trait;

use crate::domain::{
    ClientError, EndOutcome, Invite, RestaurantName, Session, SessionId, UserId,
};

/// Session lifecycle operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionsApi: Send + Sync {
    /// Create a session owned by `creator`.
    async fn create_session(&self, creator: &UserId) -> Result<Session, ClientError>;

    /// List every session visible to the client.
    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError>;

    /// Fetch one session including its candidates.
    async fn get_session(&self, session_id: SessionId) -> Result<Session, ClientError>;

    /// Add a participant.
    async fn invite(&self, invite: &Invite) -> Result<(), ClientError>;

    /// Add a candidate attributed to `submitter`.
    async fn add_restaurant(
        &self,
        session_id: SessionId,
        submitter: &UserId,
        name: &RestaurantName,
    ) -> Result<(), ClientError>;

    /// Close voting and return the backend's pick.
    async fn end_session(
        &self,
        session_id: SessionId,
        user: &UserId,
    ) -> Result<EndOutcome, ClientError>;
}
