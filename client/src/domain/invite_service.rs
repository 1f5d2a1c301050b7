//! Invite a participant by display name.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{SessionsApi, UsersApi};
use crate::domain::{AppContext, ClientError, Invite, SessionId, UserName};

/// Resolves a display name and adds that user to a session.
#[derive(Clone)]
pub struct InviteService<U, S> {
    users: Arc<U>,
    sessions: Arc<S>,
    context: Arc<AppContext>,
}

impl<U, S> InviteService<U, S> {
    /// Create the service over the user and session ports.
    pub const fn new(users: Arc<U>, sessions: Arc<S>, context: Arc<AppContext>) -> Self {
        Self {
            users,
            sessions,
            context,
        }
    }
}

impl<U, S> InviteService<U, S>
where
    U: UsersApi,
    S: SessionsApi,
{
    /// Invite the user called `invitee_name` into `session_id`.
    ///
    /// The invite request is only sent once the name resolved to a user.
    ///
    /// # Errors
    ///
    /// Fails with missing identity, invalid request for a blank name, not
    /// found when no user has the name, or the backend's invite error.
    pub async fn invite_by_name(
        &self,
        session_id: SessionId,
        invitee_name: &str,
    ) -> Result<Invite, ClientError> {
        let inviter_id = self.context.require_user_id()?;
        let name = UserName::new(invitee_name)
            .map_err(|err| ClientError::invalid_request(err.to_string()))?;

        let invitee = self
            .users
            .find_user_by_name(&name)
            .await
            .inspect_err(|err| {
                warn!(session_id = %session_id, invitee = %name, error = %err, "invitee lookup failed");
            })?;

        let invite = Invite {
            session_id,
            inviter_id,
            invitee_id: invitee.id().clone(),
        };
        self.sessions.invite(&invite).await.inspect_err(|err| {
            warn!(session_id = %session_id, invitee = %name, error = %err, "invite rejected");
        })?;
        info!(session_id = %session_id, invitee_id = %invite.invitee_id, "participant invited");
        Ok(invite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockSessionsApi, MockUsersApi};
    use crate::domain::{ErrorCode, User, UserId};
    use crate::outbound::storage::InMemoryStateStore;
    use rstest::{fixture, rstest};

    #[fixture]
    fn context() -> Arc<AppContext> {
        let context = AppContext::init(Arc::new(InMemoryStateStore::default())).expect("init");
        context
            .set_identity(UserId::random(), None)
            .expect("identity");
        Arc::new(context)
    }

    fn bob() -> User {
        User::new(UserId::random(), UserName::new("bob").expect("name"), None)
    }

    #[rstest]
    #[tokio::test]
    async fn resolved_names_are_invited(context: Arc<AppContext>) {
        let invitee = bob();
        let invitee_id = invitee.id().clone();
        let inviter_id = context.current_user_id().expect("identity");
        let session_id = SessionId::random();

        let mut users = MockUsersApi::new();
        users
            .expect_find_user_by_name()
            .withf(|name| name.as_ref() == "bob")
            .return_once(move |_| Ok(invitee));
        let mut sessions = MockSessionsApi::new();
        let expected = Invite {
            session_id,
            inviter_id,
            invitee_id: invitee_id.clone(),
        };
        sessions
            .expect_invite()
            .withf(move |invite| invite == &expected)
            .times(1)
            .returning(|_| Ok(()));

        let service = InviteService::new(Arc::new(users), Arc::new(sessions), context);
        let invite = service
            .invite_by_name(session_id, " bob ")
            .await
            .expect("invite succeeds");
        assert_eq!(invite.invitee_id, invitee_id);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_names_never_send_an_invite(context: Arc<AppContext>) {
        let mut users = MockUsersApi::new();
        users
            .expect_find_user_by_name()
            .returning(|name| Err(ClientError::not_found(format!("user {name} not found"))));
        let mut sessions = MockSessionsApi::new();
        sessions.expect_invite().times(0);

        let service = InviteService::new(Arc::new(users), Arc::new(sessions), context);
        let err = service
            .invite_by_name(SessionId::random(), "nobody")
            .await
            .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_names_are_rejected_locally(context: Arc<AppContext>) {
        let mut users = MockUsersApi::new();
        users.expect_find_user_by_name().times(0);
        let mut sessions = MockSessionsApi::new();
        sessions.expect_invite().times(0);

        let service = InviteService::new(Arc::new(users), Arc::new(sessions), context);
        let err = service
            .invite_by_name(SessionId::random(), "  ")
            .await
            .expect_err("blank name");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn backend_refusal_is_returned(context: Arc<AppContext>) {
        let mut users = MockUsersApi::new();
        users.expect_find_user_by_name().returning(|_| Ok(bob()));
        let mut sessions = MockSessionsApi::new();
        sessions
            .expect_invite()
            .returning(|_| Err(ClientError::forbidden("Only creator can invite").with_status(403)));

        let service = InviteService::new(Arc::new(users), Arc::new(sessions), context);
        let err = service
            .invite_by_name(SessionId::random(), "bob")
            .await
            .expect_err("not the creator");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn inviting_requires_identity() {
        let context =
            Arc::new(AppContext::init(Arc::new(InMemoryStateStore::default())).expect("init"));
        let mut users = MockUsersApi::new();
        users.expect_find_user_by_name().times(0);

        let service = InviteService::new(Arc::new(users), Arc::new(MockSessionsApi::new()), context);
        let err = service
            .invite_by_name(SessionId::random(), "bob")
            .await
            .expect_err("no identity");
        assert_eq!(err.code(), ErrorCode::MissingIdentity);
    }
}
