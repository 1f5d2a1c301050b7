//! Session creation, joining, and ending.
//!
//! Ending is the one irreversible transition the client drives. Once this
//! client has ended a session the outcome is kept in the [`AppContext`], and
//! a repeated end returns it without another request so the reported
//! winner can never change.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::SessionsApi;
use crate::domain::{AppContext, ClientError, EndOutcome, Session, SessionId, UserId};

/// Drives the session lifecycle against the sessions port.
#[derive(Clone)]
pub struct SessionService<S> {
    sessions: Arc<S>,
    context: Arc<AppContext>,
}

impl<S> SessionService<S> {
    /// Create the service over a sessions port and the shared context.
    pub const fn new(sessions: Arc<S>, context: Arc<AppContext>) -> Self {
        Self { sessions, context }
    }
}

impl<S> SessionService<S>
where
    S: SessionsApi,
{
    /// Create a session owned by `creator`, or by the stored identity.
    ///
    /// On success the session is remembered as created by this client.
    ///
    /// # Errors
    ///
    /// Fails with a missing-identity error before any request when neither
    /// an explicit creator nor a stored identity exists. Backend failures
    /// are returned with the backend's message.
    pub async fn create_session(&self, creator: Option<UserId>) -> Result<Session, ClientError> {
        let creator_id = match creator {
            Some(id) => id,
            None => self.context.require_user_id()?,
        };
        let session = self
            .sessions
            .create_session(&creator_id)
            .await
            .inspect_err(|err| {
                warn!(creator_id = %creator_id, error = %err, "session creation failed");
            })?;
        self.context.mark_created(session.id())?;
        info!(session_id = %session.id(), creator_id = %creator_id, "session created");
        Ok(session)
    }

    /// Confirm that `session_id` exists before routing into it.
    ///
    /// # Errors
    ///
    /// Returns the backend error, typically not found.
    pub async fn join(&self, session_id: SessionId) -> Result<Session, ClientError> {
        let session = self.fetch(session_id).await.inspect_err(|err| {
            warn!(session_id = %session_id, error = %err, "join failed");
        })?;
        info!(session_id = %session_id, "joined session");
        Ok(session)
    }

    /// Fetch one session, overlaying any outcome this client recorded.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn fetch(&self, session_id: SessionId) -> Result<Session, ClientError> {
        let session = self.sessions.get_session(session_id).await?;
        Ok(self.overlay_outcome(session))
    }

    /// List every session, overlaying outcomes this client recorded.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn list(&self) -> Result<Vec<Session>, ClientError> {
        let sessions = self.sessions.list_sessions().await.inspect_err(|err| {
            warn!(error = %err, "listing sessions failed");
        })?;
        Ok(sessions
            .into_iter()
            .map(|session| self.overlay_outcome(session))
            .collect())
    }

    /// Close voting on `session_id` and return the winner.
    ///
    /// # Errors
    ///
    /// Fails with a missing-identity error when no identity is stored, or
    /// with the backend error. A failed end leaves the session open and may
    /// be retried.
    pub async fn end_session(&self, session_id: SessionId) -> Result<EndOutcome, ClientError> {
        let user_id = self.context.require_user_id()?;
        if let Some(outcome) = self.context.known_outcome(session_id) {
            info!(session_id = %session_id, "session already ended here; reusing outcome");
            return Ok(outcome);
        }
        let outcome = self
            .sessions
            .end_session(session_id, &user_id)
            .await
            .inspect_err(|err| {
                warn!(session_id = %session_id, error = %err, "ending session failed");
            })?;
        self.context.record_outcome(session_id, outcome.clone());
        info!(
            session_id = %session_id,
            winner = outcome.winner.as_ref().map_or("none", |name| name.as_ref()),
            "session ended"
        );
        Ok(outcome)
    }

    /// Shared application context.
    #[must_use]
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    fn overlay_outcome(&self, session: Session) -> Session {
        match self.context.known_outcome(session.id()) {
            Some(outcome) => session.into_ended(outcome.winner),
            None => session,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Lifecycle behaviour against a mocked sessions port.

    use super::*;
    use crate::domain::ports::MockSessionsApi;
    use crate::domain::{ErrorCode, RestaurantName, SessionStatus};
    use crate::outbound::storage::InMemoryStateStore;
    use rstest::{fixture, rstest};

    #[fixture]
    fn context() -> Arc<AppContext> {
        Arc::new(AppContext::init(Arc::new(InMemoryStateStore::default())).expect("init"))
    }

    fn with_identity(context: &AppContext) -> UserId {
        let user_id = UserId::random();
        context
            .set_identity(user_id.clone(), None)
            .expect("identity");
        user_id
    }

    fn winner(name: &str) -> EndOutcome {
        EndOutcome {
            winner: Some(RestaurantName::new(name).expect("name")),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_without_identity_sends_nothing(context: Arc<AppContext>) {
        let mut sessions = MockSessionsApi::new();
        sessions.expect_create_session().times(0);

        let service = SessionService::new(Arc::new(sessions), context);
        let err = service.create_session(None).await.expect_err("no identity");
        assert_eq!(err.code(), ErrorCode::MissingIdentity);
    }

    #[rstest]
    #[tokio::test]
    async fn create_marks_the_session_as_owned(context: Arc<AppContext>) {
        let creator = with_identity(&context);
        let session_id = SessionId::random();
        let mut sessions = MockSessionsApi::new();
        sessions
            .expect_create_session()
            .times(1)
            .returning(move |creator| Ok(Session::new(session_id, creator.clone(), Vec::new())));

        let service = SessionService::new(Arc::new(sessions), context.clone());
        let session = service.create_session(None).await.expect("created");

        assert_eq!(session.creator_id(), &creator);
        assert!(context.is_owner(session_id));
    }

    #[rstest]
    #[tokio::test]
    async fn explicit_creator_takes_precedence(context: Arc<AppContext>) {
        with_identity(&context);
        let explicit = UserId::random();
        let expected = explicit.clone();
        let mut sessions = MockSessionsApi::new();
        sessions
            .expect_create_session()
            .withf(move |creator| creator == &expected)
            .returning(|creator| Ok(Session::new(SessionId::random(), creator.clone(), Vec::new())));

        let service = SessionService::new(Arc::new(sessions), context);
        let session = service
            .create_session(Some(explicit.clone()))
            .await
            .expect("created");
        assert_eq!(session.creator_id(), &explicit);
    }

    #[rstest]
    #[tokio::test]
    async fn backend_failure_is_surfaced_verbatim(context: Arc<AppContext>) {
        with_identity(&context);
        let mut sessions = MockSessionsApi::new();
        sessions
            .expect_create_session()
            .returning(|_| Err(ClientError::backend("Creator not found").with_status(500)));

        let service = SessionService::new(Arc::new(sessions), context.clone());
        let err = service.create_session(None).await.expect_err("backend fails");
        assert_eq!(err.message(), "Creator not found");
        assert!(context.created_session_id().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn end_requires_identity(context: Arc<AppContext>) {
        let mut sessions = MockSessionsApi::new();
        sessions.expect_end_session().times(0);

        let service = SessionService::new(Arc::new(sessions), context);
        let err = service
            .end_session(SessionId::random())
            .await
            .expect_err("no identity");
        assert_eq!(err.code(), ErrorCode::MissingIdentity);
    }

    #[rstest]
    #[tokio::test]
    async fn ending_twice_reuses_the_first_outcome(context: Arc<AppContext>) {
        with_identity(&context);
        let session_id = SessionId::random();
        let mut sessions = MockSessionsApi::new();
        sessions
            .expect_end_session()
            .times(1)
            .returning(|_, _| Ok(winner("Pizza Place")));

        let service = SessionService::new(Arc::new(sessions), context);
        let first = service.end_session(session_id).await.expect("first end");
        let second = service.end_session(session_id).await.expect("second end");
        assert_eq!(first, winner("Pizza Place"));
        assert_eq!(second, first);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_end_can_be_retried(context: Arc<AppContext>) {
        with_identity(&context);
        let session_id = SessionId::random();
        let mut sessions = MockSessionsApi::new();
        let mut seq = mockall::Sequence::new();
        sessions
            .expect_end_session()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ClientError::transport("connection refused")));
        sessions
            .expect_end_session()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(EndOutcome { winner: None }));

        let service = SessionService::new(Arc::new(sessions), context.clone());
        service
            .end_session(session_id)
            .await
            .expect_err("first attempt fails");
        assert!(context.known_outcome(session_id).is_none());
        let outcome = service.end_session(session_id).await.expect("retry");
        assert_eq!(outcome.winner, None);
    }

    #[rstest]
    #[tokio::test]
    async fn fetch_overlays_locally_known_outcomes(context: Arc<AppContext>) {
        let session_id = SessionId::random();
        context.record_outcome(session_id, winner("Sushi Bar"));
        let mut sessions = MockSessionsApi::new();
        sessions
            .expect_get_session()
            .returning(|id| Ok(Session::new(id, UserId::random(), Vec::new())));

        let service = SessionService::new(Arc::new(sessions), context);
        let session = service.fetch(session_id).await.expect("fetched");
        assert_eq!(
            session.status(),
            &SessionStatus::Ended {
                winner: Some(RestaurantName::new("Sushi Bar").expect("name")),
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn join_reports_unknown_sessions(context: Arc<AppContext>) {
        let mut sessions = MockSessionsApi::new();
        sessions
            .expect_get_session()
            .returning(|id| Err(ClientError::not_found(format!("session {id} not found"))));

        let service = SessionService::new(Arc::new(sessions), context);
        let err = service
            .join(SessionId::random())
            .await
            .expect_err("unknown session");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
