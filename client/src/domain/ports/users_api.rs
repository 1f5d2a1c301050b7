//! Driven port for the backend's user endpoints.

use async_trait::async_trait;

use crate::domain::{ClientError, NewUser, Registration, User, UserName};

/// User registration and lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Register a user and return it with any issued bearer token.
    async fn register(&self, new_user: &NewUser) -> Result<Registration, ClientError>;

    /// Resolve a display name to a user.
    ///
    /// Fails with [`crate::domain::ErrorCode::NotFound`] when no user has
    /// that name.
    async fn find_user_by_name(&self, name: &UserName) -> Result<User, ClientError>;
}
