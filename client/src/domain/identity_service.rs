//! Registration flow that establishes the acting identity.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::UsersApi;
use crate::domain::{AppContext, ClientError, EmailAddress, NewUser, User, UserName};

/// Registers users and stores the resulting identity in the context.
#[derive(Clone)]
pub struct IdentityService<U> {
    users: Arc<U>,
    context: Arc<AppContext>,
}

impl<U> IdentityService<U> {
    /// Create the service over a users port and the shared context.
    pub const fn new(users: Arc<U>, context: Arc<AppContext>) -> Self {
        Self { users, context }
    }
}

impl<U> IdentityService<U>
where
    U: UsersApi,
{
    /// Register `name` and make the new user the acting identity.
    ///
    /// Blank names and malformed emails are rejected before any request.
    /// A failed registration leaves the previous identity untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the backend's error.
    pub async fn register(&self, name: &str, email: Option<&str>) -> Result<User, ClientError> {
        let user_name = UserName::new(name)
            .map_err(|err| ClientError::invalid_request(err.to_string()))?;
        let address = email
            .filter(|raw| !raw.trim().is_empty())
            .map(EmailAddress::new)
            .transpose()
            .map_err(|err| ClientError::invalid_request(err.to_string()))?;

        let registration = self
            .users
            .register(&NewUser {
                name: user_name,
                email: address,
            })
            .await
            .inspect_err(|err| warn!(code = ?err.code(), error = %err, "registration failed"))?;

        self.context
            .set_identity(registration.user.id().clone(), registration.token)?;
        info!(user_id = %registration.user.id(), "user registered");
        Ok(registration.user)
    }
}
