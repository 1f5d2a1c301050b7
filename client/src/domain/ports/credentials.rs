//! Driven port supplying the bearer credential for outgoing requests.

use crate::domain::AuthToken;

/// Source of the optional bearer token attached to every request.
pub trait CredentialSource: Send + Sync {
    /// Current token; `None` sends the request unauthenticated.
    fn bearer_token(&self) -> Option<AuthToken>;
}

/// Credential source that never supplies a token.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn bearer_token(&self) -> Option<AuthToken> {
        None
    }
}
