//! Voting sessions and their client-observed lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClientError, Restaurant, RestaurantName, UserId};

/// Validation errors for session values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    /// The id string was empty.
    EmptyId,
    /// The id string was not a UUID.
    InvalidId,
}

impl fmt::Display for SessionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "session id must not be empty"),
            Self::InvalidId => write!(f, "session id must be a valid UUID"),
        }
    }
}

impl std::error::Error for SessionValidationError {}

/// Backend identifier of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(Uuid);

impl SessionId {
    /// Parse a session id, tolerating surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SessionValidationError`] for blank or non-UUID input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SessionValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SessionValidationError::EmptyId);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| SessionValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for SessionId {
    type Err = SessionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Lifecycle of a session. `Ended` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Accepting invites and candidates.
    Open,
    /// Voting closed; the winner was chosen by the backend.
    Ended {
        /// Chosen candidate, or `None` when nothing was picked.
        winner: Option<RestaurantName>,
    },
}

/// Result of ending a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOutcome {
    /// Chosen candidate, or `None` when nothing was picked.
    pub winner: Option<RestaurantName>,
}

/// A voting round as seen by the client.
///
/// # Examples
///
/// ```
/// use lunch_client::domain::{RestaurantName, Session, SessionId, UserId};
///
/// let session = Session::new(SessionId::random(), UserId::random(), Vec::new());
/// let ended = session
///     .end(Some(RestaurantName::new("Sushi Bar").expect("name")))
///     .expect("open sessions can end");
/// assert!(ended.ended());
/// assert!(ended.end(None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    creator_id: UserId,
    restaurants: Vec<Restaurant>,
    status: SessionStatus,
}

impl Session {
    /// Build an open session.
    #[must_use]
    pub const fn new(id: SessionId, creator_id: UserId, restaurants: Vec<Restaurant>) -> Self {
        Self {
            id,
            creator_id,
            restaurants,
            status: SessionStatus::Open,
        }
    }

    /// Build a session with an explicit status.
    #[must_use]
    pub const fn with_status(
        id: SessionId,
        creator_id: UserId,
        restaurants: Vec<Restaurant>,
        status: SessionStatus,
    ) -> Self {
        Self {
            id,
            creator_id,
            restaurants,
            status,
        }
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The single creator, fixed at creation.
    #[must_use]
    pub const fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    /// Candidates in backend order.
    #[must_use]
    pub fn restaurants(&self) -> &[Restaurant] {
        self.restaurants.as_slice()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Whether voting has closed.
    #[must_use]
    pub const fn ended(&self) -> bool {
        matches!(self.status, SessionStatus::Ended { .. })
    }

    /// Winning candidate once ended.
    #[must_use]
    pub const fn winner(&self) -> Option<&RestaurantName> {
        match &self.status {
            SessionStatus::Ended { winner } => winner.as_ref(),
            SessionStatus::Open => None,
        }
    }

    /// Transition `Open -> Ended`.
    ///
    /// # Errors
    ///
    /// Returns a conflict error when the session has already ended.
    pub fn end(self, winner: Option<RestaurantName>) -> Result<Self, ClientError> {
        if self.ended() {
            return Err(ClientError::conflict(format!(
                "session {} has already ended",
                self.id
            )));
        }
        Ok(self.into_ended(winner))
    }

    /// Force the ended state, keeping an existing winner.
    pub(crate) fn into_ended(self, winner: Option<RestaurantName>) -> Self {
        if self.ended() {
            return self;
        }
        Self {
            status: SessionStatus::Ended { winner },
            ..self
        }
    }
}

/// Transient invite request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    /// Session receiving the participant.
    pub session_id: SessionId,
    /// Creator sending the invite.
    pub inviter_id: UserId,
    /// User being added.
    pub invitee_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    fn open_session() -> Session {
        Session::new(SessionId::random(), UserId::random(), Vec::new())
    }

    #[test]
    fn session_ids_tolerate_surrounding_whitespace() {
        let id = SessionId::new(" 3fa85f64-5717-4562-b3fc-2c963f66afa6\n").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn session_ids_reject_blank_and_malformed_input() {
        assert_eq!(SessionId::new(""), Err(SessionValidationError::EmptyId));
        assert_eq!(SessionId::new("abc"), Err(SessionValidationError::InvalidId));
    }

    #[test]
    fn ending_records_the_winner() {
        let winner = RestaurantName::new("Pizza Place").expect("name");
        let ended = open_session().end(Some(winner.clone())).expect("end");
        assert!(ended.ended());
        assert_eq!(ended.winner(), Some(&winner));
    }

    #[test]
    fn ending_twice_is_a_conflict_and_keeps_the_first_winner() {
        let winner = RestaurantName::new("Pizza Place").expect("name");
        let ended = open_session().end(Some(winner.clone())).expect("end");
        let err = ended
            .clone()
            .end(Some(RestaurantName::new("Sushi Bar").expect("name")))
            .expect_err("second end must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(ended.winner(), Some(&winner));
    }

    #[test]
    fn open_sessions_have_no_winner() {
        assert!(open_session().winner().is_none());
    }
}
