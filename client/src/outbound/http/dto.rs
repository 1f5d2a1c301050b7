//! Wire DTOs for the lunch backend.
//!
//! Responses decode into these transport records first and are then mapped
//! into domain values in one pass. Two payload generations are accepted:
//! the flat form (`creatorId`, `ended`, `winner`) and the entity form
//! (`creator`, `active`, `pickedRestaurant`). Unknown fields are ignored.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    EmailAddress, EndOutcome, Restaurant, RestaurantId, RestaurantName, Session, SessionId,
    SessionStatus, User, UserId, UserName,
};

#[derive(Debug, Serialize)]
pub(super) struct RegisterUserBody<'a> {
    pub(super) name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InviteBody {
    pub(super) inviter_id: String,
    pub(super) invitee_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct RestaurantRef<'a> {
    pub(super) name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddRestaurantBody<'a> {
    pub(super) user_id: String,
    pub(super) restaurant_name: &'a str,
    pub(super) restaurant: RestaurantRef<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EndSessionBody {
    pub(super) user_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    #[serde(alias = "uuid")]
    pub(super) id: String,
    pub(super) name: String,
    #[serde(default)]
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) token: Option<String>,
    #[serde(default)]
    pub(super) jwt: Option<String>,
}

impl UserDto {
    pub(super) fn into_domain(self) -> Result<User, String> {
        let id = UserId::new(&self.id).map_err(|err| format!("user id {:?}: {err}", self.id))?;
        let name = UserName::new(&self.name).map_err(|err| format!("user {id}: {err}"))?;
        let email = self
            .email
            .filter(|raw| !raw.trim().is_empty())
            .map(EmailAddress::new)
            .transpose()
            .map_err(|err| format!("user {id}: {err}"))?;
        Ok(User::new(id, name, email))
    }

    pub(super) fn body_token(&self) -> Option<&str> {
        self.token.as_deref().or(self.jwt.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserRefDto {
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum WinnerDto {
    Name(String),
    Restaurant { name: Option<String> },
}

impl WinnerDto {
    fn into_name(self) -> Option<RestaurantName> {
        let raw = match self {
            Self::Name(name) => Some(name),
            Self::Restaurant { name } => name,
        };
        raw.and_then(|name| RestaurantName::new(name).ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RestaurantDto {
    #[serde(default)]
    pub(super) id: Option<String>,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) submitted_by: Option<String>,
}

impl RestaurantDto {
    fn into_domain(self) -> Result<Restaurant, String> {
        let raw = self
            .name
            .ok_or_else(|| "restaurant has no name".to_owned())?;
        let name = RestaurantName::new(raw).map_err(|err| err.to_string())?;
        let id = self
            .id
            .as_deref()
            .map(RestaurantId::new)
            .transpose()
            .map_err(|err| format!("restaurant {name}: {err}"))?;
        let submitted_by = self
            .submitted_by
            .as_deref()
            .map(UserId::new)
            .transpose()
            .map_err(|err| format!("restaurant {name}: {err}"))?;
        Ok(Restaurant::new(id, name, submitted_by))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) creator_id: Option<String>,
    #[serde(default)]
    pub(super) creator: Option<UserRefDto>,
    #[serde(default)]
    pub(super) restaurants: Vec<RestaurantDto>,
    #[serde(default)]
    pub(super) ended: Option<bool>,
    #[serde(default)]
    pub(super) active: Option<bool>,
    #[serde(default)]
    pub(super) winner: Option<WinnerDto>,
    #[serde(default)]
    pub(super) picked_restaurant: Option<WinnerDto>,
}

impl SessionDto {
    pub(super) fn into_domain(self) -> Result<Session, String> {
        let id = SessionId::new(&self.id).map_err(|err| format!("session id {:?}: {err}", self.id))?;
        let raw_creator = self
            .creator_id
            .or_else(|| self.creator.map(|creator| creator.id))
            .ok_or_else(|| format!("session {id} has no creator"))?;
        let creator_id =
            UserId::new(&raw_creator).map_err(|err| format!("session {id} creator: {err}"))?;
        let restaurants = self
            .restaurants
            .into_iter()
            .filter_map(|dto| match dto.into_domain() {
                Ok(restaurant) => Some(restaurant),
                Err(reason) => {
                    warn!(session_id = %id, %reason, "skipping undecodable candidate");
                    None
                }
            })
            .collect();

        let winner = self
            .winner
            .or(self.picked_restaurant)
            .and_then(WinnerDto::into_name);
        let ended = self
            .ended
            .or_else(|| self.active.map(|active| !active))
            .unwrap_or(winner.is_some());
        let status = if ended {
            SessionStatus::Ended { winner }
        } else {
            SessionStatus::Open
        };
        Ok(Session::with_status(id, creator_id, restaurants, status))
    }
}

/// Map a session listing into domain sessions, one row at a time.
///
/// Rows that do not decode are logged and left out of the listing.
pub(super) fn sessions_from_rows(rows: Vec<serde_json::Value>) -> Vec<Session> {
    rows.into_iter()
        .filter_map(|row| {
            let decoded = serde_json::from_value::<SessionDto>(row)
                .map_err(|err| err.to_string())
                .and_then(SessionDto::into_domain);
            match decoded {
                Ok(session) => Some(session),
                Err(reason) => {
                    warn!(%reason, "skipping undecodable session row");
                    None
                }
            }
        })
        .collect()
}

/// Decode the end-session response body.
///
/// Accepts an empty body, a plain-text name, a JSON string, or a JSON object
/// with a `name` field. A blank name means no winner.
pub(super) fn parse_end_outcome(body: &[u8]) -> EndOutcome {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return EndOutcome { winner: None };
    }
    let winner = match serde_json::from_str::<WinnerDto>(trimmed) {
        Ok(dto) => dto.into_name(),
        Err(_) => RestaurantName::new(trimmed).ok(),
    };
    EndOutcome { winner }
}
