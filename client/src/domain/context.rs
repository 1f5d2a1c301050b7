//! Explicit application context shared by every flow.
//!
//! The context replaces ambient local-storage lookups: it owns the identity
//! holder and the "created session" marker, writes every change through to
//! the [`ClientStateStore`], and remembers the outcomes of sessions this
//! client ended so a repeated end never reports a different winner.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use super::ports::{ClientState, ClientStateStore, CredentialSource};
use super::{AuthToken, ClientError, EndOutcome, SessionId, UserId};

/// Application context with an explicit init/teardown lifecycle.
pub struct AppContext {
    store: Arc<dyn ClientStateStore>,
    state: Mutex<ClientState>,
    outcomes: Mutex<HashMap<SessionId, EndOutcome>>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("state", &*lock(&self.state))
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // State is plain data; a panic mid-update cannot leave it half-written.
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl AppContext {
    /// Load persisted state and build the context.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the store cannot be read.
    pub fn init(store: Arc<dyn ClientStateStore>) -> Result<Self, ClientError> {
        let state = store.load()?;
        debug!(
            has_identity = state.user_id.is_some(),
            has_created_session = state.created_session_id.is_some(),
            "client context loaded"
        );
        Ok(Self {
            store,
            state: Mutex::new(state),
            outcomes: Mutex::new(HashMap::new()),
        })
    }

    /// Flush the current state to the store.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the store cannot be written.
    pub fn teardown(&self) -> Result<(), ClientError> {
        let snapshot = lock(&self.state).clone();
        self.store
            .save(&snapshot)
            .map_err(ClientError::from)
    }

    /// Snapshot of the persisted fields.
    #[must_use]
    pub fn state(&self) -> ClientState {
        lock(&self.state).clone()
    }

    /// Acting identity, if one has been registered.
    #[must_use]
    pub fn current_user_id(&self) -> Option<UserId> {
        lock(&self.state).user_id.clone()
    }

    /// Acting identity, or a precondition failure.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::missing_identity`] when none is stored.
    pub fn require_user_id(&self) -> Result<UserId, ClientError> {
        self.current_user_id()
            .ok_or_else(ClientError::missing_identity)
    }

    /// Replace the acting identity and its credential.
    ///
    /// A token belongs to the identity it was issued for, so a missing
    /// token clears the previous one.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the new state cannot be persisted.
    pub fn set_identity(
        &self,
        user_id: UserId,
        token: Option<AuthToken>,
    ) -> Result<(), ClientError> {
        info!(user_id = %user_id, has_token = token.is_some(), "identity stored");
        self.update(|state| {
            state.user_id = Some(user_id);
            state.auth_token = token;
        })
    }

    /// Remember `session_id` as created by this client.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the new state cannot be persisted.
    pub fn mark_created(&self, session_id: SessionId) -> Result<(), ClientError> {
        info!(session_id = %session_id, "session marked as created here");
        self.update(|state| state.created_session_id = Some(session_id))
    }

    /// Session most recently created by this client.
    #[must_use]
    pub fn created_session_id(&self) -> Option<SessionId> {
        lock(&self.state).created_session_id
    }

    /// Whether this client created `session_id`. Advisory UI gating only.
    #[must_use]
    pub fn is_owner(&self, session_id: SessionId) -> bool {
        self.created_session_id() == Some(session_id)
    }

    /// Record the outcome of a session this client ended.
    pub fn record_outcome(&self, session_id: SessionId, outcome: EndOutcome) {
        lock(&self.outcomes).entry(session_id).or_insert(outcome);
    }

    /// Outcome recorded by [`Self::record_outcome`], if any.
    #[must_use]
    pub fn known_outcome(&self, session_id: SessionId) -> Option<EndOutcome> {
        lock(&self.outcomes).get(&session_id).cloned()
    }

    fn update(&self, change: impl FnOnce(&mut ClientState)) -> Result<(), ClientError> {
        let snapshot = {
            let mut state = lock(&self.state);
            change(&mut state);
            state.clone()
        };
        self.store
            .save(&snapshot)
            .map_err(ClientError::from)
    }
}

impl CredentialSource for AppContext {
    fn bearer_token(&self) -> Option<AuthToken> {
        lock(&self.state).auth_token.clone()
    }
}
