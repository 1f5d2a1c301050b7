//! User identity model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The id string was empty.
    EmptyId,
    /// The id string was not a UUID.
    InvalidId,
    /// The user name was blank.
    EmptyName,
    /// The email address was blank.
    EmptyEmail,
    /// The email address had no `@`.
    InvalidEmail,
    /// The bearer token was blank.
    EmptyToken,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must contain '@'"),
            Self::EmptyToken => write!(f, "auth token must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError`] when the input is empty or not a UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name used to find and invite users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate a display name; surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::EmptyName`] for blank input.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact email address supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate an email address.
    ///
    /// Only the shape is checked; delivery is the backend's concern.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError`] for blank input or input without `@`.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !trimmed.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Bearer credential returned at registration.
///
/// The value is never printed by [`fmt::Debug`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthToken(String);

impl AuthToken {
    /// Validate a raw token string; a leading `Bearer ` scheme is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::EmptyToken`] for blank input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let leading = raw.as_ref().trim_start();
        let token = leading.strip_prefix("Bearer ").unwrap_or(leading).trim();
        if token.is_empty() {
            return Err(UserValidationError::EmptyToken);
        }
        Ok(Self(token.to_owned()))
    }

    /// Raw token value for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

impl From<AuthToken> for String {
    fn from(value: AuthToken) -> Self {
        value.0
    }
}

impl TryFrom<String> for AuthToken {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered application user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: Option<EmailAddress>,
}

impl User {
    /// Build a user from validated components.
    #[must_use]
    pub const fn new(id: UserId, name: UserName, email: Option<EmailAddress>) -> Self {
        Self { id, name, email }
    }

    /// Backend-issued identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Optional contact email.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }
}

/// Input for the registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name to register.
    pub name: UserName,
    /// Optional contact email.
    pub email: Option<EmailAddress>,
}

/// Registration result: the stored user plus an optional bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The created user.
    pub user: User,
    /// Token issued alongside the user, if any.
    pub token: Option<AuthToken>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    fn user_id_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[test]
    fn user_id_round_trips_through_json() {
        let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let json = serde_json::to_string(&id).expect("encode");
        assert_eq!(json, "\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"");
        let decoded: UserId = serde_json::from_str(&json).expect("decode");
        assert_eq!(decoded, id);
    }

    #[test]
    fn user_name_is_trimmed_and_must_not_be_blank() {
        assert_eq!(
            UserName::new("  Ada ").expect("valid name").as_ref(),
            "Ada"
        );
        assert_eq!(UserName::new("   "), Err(UserValidationError::EmptyName));
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("ada.example.com", UserValidationError::InvalidEmail)]
    fn email_requires_an_at_sign(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(EmailAddress::new(raw), Err(expected));
    }

    #[test]
    fn auth_token_strips_the_bearer_scheme_and_hides_its_value() {
        let token = AuthToken::new("Bearer abc.def.ghi").expect("valid token");
        assert_eq!(token.expose(), "abc.def.ghi");
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
        assert_eq!(AuthToken::new("Bearer "), Err(UserValidationError::EmptyToken));
    }
}
