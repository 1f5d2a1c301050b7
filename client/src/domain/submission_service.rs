//! Restaurant candidate submission.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::SessionsApi;
use crate::domain::{AppContext, ClientError, Restaurant, RestaurantName, SessionId};

/// Submits candidates attributed to the acting identity.
#[derive(Clone)]
pub struct SubmissionService<S> {
    sessions: Arc<S>,
    context: Arc<AppContext>,
}

impl<S> SubmissionService<S> {
    /// Create the service over a sessions port and the shared context.
    pub const fn new(sessions: Arc<S>, context: Arc<AppContext>) -> Self {
        Self { sessions, context }
    }
}

impl<S> SubmissionService<S>
where
    S: SessionsApi,
{
    /// Add `restaurant_name` as a candidate in `session_id`.
    ///
    /// # Errors
    ///
    /// Identity and a non-blank name are checked before any request; the
    /// backend's error is returned otherwise.
    pub async fn submit(
        &self,
        session_id: SessionId,
        restaurant_name: &str,
    ) -> Result<Restaurant, ClientError> {
        let user_id = self.context.require_user_id()?;
        let name = RestaurantName::new(restaurant_name)
            .map_err(|err| ClientError::invalid_request(err.to_string()))?;

        self.sessions
            .add_restaurant(session_id, &user_id, &name)
            .await
            .inspect_err(|err| {
                warn!(session_id = %session_id, restaurant = %name, error = %err, "submission failed");
            })?;
        info!(session_id = %session_id, restaurant = %name, "restaurant submitted");
        Ok(Restaurant::new(None, name, Some(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockSessionsApi;
    use crate::domain::{ErrorCode, UserId};
    use crate::outbound::storage::InMemoryStateStore;
    use rstest::rstest;

    fn context(with_identity: bool) -> Arc<AppContext> {
        let context = AppContext::init(Arc::new(InMemoryStateStore::default())).expect("init");
        if with_identity {
            context
                .set_identity(UserId::random(), None)
                .expect("identity");
        }
        Arc::new(context)
    }

    #[tokio::test]
    async fn submission_is_attributed_to_the_acting_user() {
        let context = context(true);
        let user_id = context.current_user_id().expect("identity");
        let expected_user = user_id.clone();
        let mut sessions = MockSessionsApi::new();
        sessions
            .expect_add_restaurant()
            .withf(move |_, submitter, name| {
                submitter == &expected_user && name.as_ref() == "Pizza Place"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = SubmissionService::new(Arc::new(sessions), context);
        let restaurant = service
            .submit(SessionId::random(), "  Pizza Place ")
            .await
            .expect("submitted");
        assert_eq!(restaurant.name().as_ref(), "Pizza Place");
        assert_eq!(restaurant.submitted_by(), Some(&user_id));
    }

    #[rstest]
    #[case(true, "", ErrorCode::InvalidRequest)]
    #[case(true, "\t ", ErrorCode::InvalidRequest)]
    #[case(false, "Pizza Place", ErrorCode::MissingIdentity)]
    #[tokio::test]
    async fn local_checks_run_before_any_request(
        #[case] with_identity: bool,
        #[case] name: &str,
        #[case] expected: ErrorCode,
    ) {
        let mut sessions = MockSessionsApi::new();
        sessions.expect_add_restaurant().times(0);

        let service = SubmissionService::new(Arc::new(sessions), context(with_identity));
        let err = service
            .submit(SessionId::random(), name)
            .await
            .expect_err("rejected locally");
        assert_eq!(err.code(), expected);
    }
}
