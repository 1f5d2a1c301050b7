//! In-process backend implementing both API ports.
//!
//! Mirrors the observable rules of the real backend closely enough for
//! tests: only the creator may invite or end, ended
//! sessions accept no candidates, and the first submitted candidate wins.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{SessionsApi, UsersApi};
use crate::domain::{
    AuthToken, ClientError, EndOutcome, Invite, NewUser, Registration, Restaurant, RestaurantName,
    Session, SessionId, User, UserId, UserName,
};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    sessions: HashMap<SessionId, Session>,
    order: Vec<SessionId>,
    participants: HashMap<SessionId, Vec<UserId>>,
    failures: VecDeque<ClientError>,
    requests: usize,
}

impl State {
    fn begin(&mut self) -> Result<(), ClientError> {
        self.requests += 1;
        self.failures.pop_front().map_or(Ok(()), Err)
    }

    fn session(&self, session_id: SessionId) -> Result<&Session, ClientError> {
        self.sessions
            .get(&session_id)
            .ok_or_else(|| ClientError::not_found("Session not found").with_status(404))
    }

    fn user_exists(&self, user_id: &UserId) -> bool {
        self.users.iter().any(|user| user.id() == user_id)
    }
}

/// Backend held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    /// Empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add a user directly, bypassing registration.
    pub fn seed_user(&self, name: UserName) -> User {
        let user = User::new(UserId::random(), name, None);
        self.lock().users.push(user.clone());
        user
    }

    /// Make the next request fail with `error`.
    pub fn fail_next(&self, error: ClientError) {
        self.lock().failures.push_back(error);
    }

    /// Number of requests received so far, failed ones included.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    /// Users added to `session_id` by invites.
    #[must_use]
    pub fn participants(&self, session_id: SessionId) -> Vec<UserId> {
        self.lock()
            .participants
            .get(&session_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl UsersApi for InMemoryBackend {
    async fn register(&self, new_user: &NewUser) -> Result<Registration, ClientError> {
        let mut state = self.lock();
        state.begin()?;
        let user = User::new(UserId::random(), new_user.name.clone(), new_user.email.clone());
        state.users.push(user.clone());
        let token = AuthToken::new(format!("memory-{}", user.id())).ok();
        Ok(Registration { user, token })
    }

    async fn find_user_by_name(&self, name: &UserName) -> Result<User, ClientError> {
        let mut state = self.lock();
        state.begin()?;
        state
            .users
            .iter()
            .find(|user| user.name() == name)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("no user named {name}")).with_status(404))
    }
}

#[async_trait]
impl SessionsApi for InMemoryBackend {
    async fn create_session(&self, creator: &UserId) -> Result<Session, ClientError> {
        let mut state = self.lock();
        state.begin()?;
        if !state.user_exists(creator) {
            return Err(ClientError::not_found("Creator not found").with_status(404));
        }
        let session = Session::new(SessionId::random(), creator.clone(), Vec::new());
        state.order.push(session.id());
        state.sessions.insert(session.id(), session.clone());
        Ok(session)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        let mut state = self.lock();
        state.begin()?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.sessions.get(id).cloned())
            .collect())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session, ClientError> {
        let mut state = self.lock();
        state.begin()?;
        state.session(session_id).cloned()
    }

    async fn invite(&self, invite: &Invite) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.begin()?;
        let session = state.session(invite.session_id)?;
        if session.creator_id() != &invite.inviter_id {
            return Err(ClientError::forbidden("Only creator can invite").with_status(403));
        }
        if session.ended() {
            return Err(ClientError::conflict("Session is not active").with_status(409));
        }
        if !state.user_exists(&invite.invitee_id) {
            return Err(ClientError::not_found("User not found").with_status(404));
        }
        let participants = state.participants.entry(invite.session_id).or_default();
        if !participants.contains(&invite.invitee_id) {
            participants.push(invite.invitee_id.clone());
        }
        Ok(())
    }

    async fn add_restaurant(
        &self,
        session_id: SessionId,
        submitter: &UserId,
        name: &RestaurantName,
    ) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.begin()?;
        let session = state.session(session_id)?;
        if session.ended() {
            return Err(ClientError::conflict("Session is not active").with_status(409));
        }
        let mut restaurants = session.restaurants().to_vec();
        restaurants.push(Restaurant::new(None, name.clone(), Some(submitter.clone())));
        let updated = Session::new(session_id, session.creator_id().clone(), restaurants);
        state.sessions.insert(session_id, updated);
        Ok(())
    }

    async fn end_session(
        &self,
        session_id: SessionId,
        user: &UserId,
    ) -> Result<EndOutcome, ClientError> {
        let mut state = self.lock();
        state.begin()?;
        let session = state.session(session_id)?;
        if session.creator_id() != user {
            return Err(ClientError::forbidden("Only creator can end the session").with_status(403));
        }
        let winner = session
            .restaurants()
            .first()
            .map(|restaurant| restaurant.name().clone());
        let ended = session.clone().end(winner.clone())?;
        state.sessions.insert(session_id, ended);
        Ok(EndOutcome { winner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    fn name(raw: &str) -> UserName {
        UserName::new(raw).expect("name")
    }

    #[tokio::test]
    async fn the_first_candidate_wins() {
        let backend = InMemoryBackend::new();
        let creator = backend.seed_user(name("ada"));
        let session = backend
            .create_session(creator.id())
            .await
            .expect("create");
        for candidate in ["Pizza Place", "Sushi Bar"] {
            backend
                .add_restaurant(
                    session.id(),
                    creator.id(),
                    &RestaurantName::new(candidate).expect("name"),
                )
                .await
                .expect("submit");
        }

        let outcome = backend
            .end_session(session.id(), creator.id())
            .await
            .expect("end");
        assert_eq!(outcome.winner.map(String::from), Some("Pizza Place".to_owned()));
    }

    #[tokio::test]
    async fn only_the_creator_may_end() {
        let backend = InMemoryBackend::new();
        let creator = backend.seed_user(name("ada"));
        let other = backend.seed_user(name("bob"));
        let session = backend
            .create_session(creator.id())
            .await
            .expect("create");

        let err = backend
            .end_session(session.id(), other.id())
            .await
            .expect_err("not the creator");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn injected_failures_apply_once() {
        let backend = InMemoryBackend::new();
        backend.fail_next(ClientError::transport("connection refused"));
        assert!(backend.list_sessions().await.is_err());
        assert!(backend.list_sessions().await.is_ok());
        assert_eq!(backend.request_count(), 2);
    }
}
