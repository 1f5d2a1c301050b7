//! Restaurant candidates submitted into a session.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Validation errors for restaurant values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestaurantValidationError {
    /// The name was blank.
    EmptyName,
    /// The id was not a UUID.
    InvalidId,
}

impl fmt::Display for RestaurantValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "restaurant name must not be empty"),
            Self::InvalidId => write!(f, "restaurant id must be a valid UUID"),
        }
    }
}

impl std::error::Error for RestaurantValidationError {}

/// Backend identifier of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestaurantId(Uuid);

impl RestaurantId {
    /// Parse a restaurant id.
    ///
    /// # Errors
    ///
    /// Returns [`RestaurantValidationError::InvalidId`] for non-UUID input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RestaurantValidationError> {
        Uuid::parse_str(raw.as_ref())
            .map(Self)
            .map_err(|_| RestaurantValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-blank restaurant name, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RestaurantName(String);

impl RestaurantName {
    /// Validate a restaurant name.
    ///
    /// # Errors
    ///
    /// Returns [`RestaurantValidationError::EmptyName`] for blank input.
    pub fn new(name: impl AsRef<str>) -> Result<Self, RestaurantValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RestaurantValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RestaurantName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RestaurantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<RestaurantName> for String {
    fn from(value: RestaurantName) -> Self {
        value.0
    }
}

impl TryFrom<String> for RestaurantName {
    type Error = RestaurantValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A candidate restaurant. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restaurant {
    id: Option<RestaurantId>,
    name: RestaurantName,
    submitted_by: Option<UserId>,
}

impl Restaurant {
    /// Build a candidate.
    #[must_use]
    pub const fn new(
        id: Option<RestaurantId>,
        name: RestaurantName,
        submitted_by: Option<UserId>,
    ) -> Self {
        Self {
            id,
            name,
            submitted_by,
        }
    }

    /// Backend id, when the backend echoed one.
    #[must_use]
    pub const fn id(&self) -> Option<RestaurantId> {
        self.id
    }

    /// Candidate name.
    #[must_use]
    pub const fn name(&self) -> &RestaurantName {
        &self.name
    }

    /// Submitting user, when known.
    #[must_use]
    pub const fn submitted_by(&self) -> Option<&UserId> {
        self.submitted_by.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        let name = RestaurantName::new("  Pizza Place ").expect("valid name");
        assert_eq!(name.as_ref(), "Pizza Place");
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            RestaurantName::new(" \t"),
            Err(RestaurantValidationError::EmptyName)
        );
    }

    #[test]
    fn ids_must_be_uuids() {
        assert_eq!(
            RestaurantId::new("pizza"),
            Err(RestaurantValidationError::InvalidId)
        );
    }
}
