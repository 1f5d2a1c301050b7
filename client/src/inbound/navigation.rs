//! Path routing and per-session view gating.
//!
//! Paths mirror the browser client's routes. Owner-only views are gated on
//! the "created session" marker in the [`AppContext`]; the gating is a UI
//! convenience and the backend remains the authority on who may act.

use std::fmt;

use crate::domain::{AppContext, ClientError, SessionId};

/// Views nested under `/session/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionView {
    /// Invite a participant by name. Owner only.
    Invite,
    /// End voting. Owner only.
    End,
    /// Submit a candidate.
    SubmitRestaurant,
    /// Watch the candidate list.
    Restaurants,
}

impl SessionView {
    /// Every view in menu order.
    pub const ALL: [Self; 4] = [
        Self::Invite,
        Self::End,
        Self::SubmitRestaurant,
        Self::Restaurants,
    ];

    /// Path segment after `/session/{id}/`.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Invite => "invite",
            Self::End => "end",
            Self::SubmitRestaurant => "submit-restaurant",
            Self::Restaurants => "restaurants",
        }
    }

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Invite => "Invite",
            Self::End => "End Session",
            Self::SubmitRestaurant => "Submit Restaurant",
            Self::Restaurants => "View Submitted Restaurants",
        }
    }

    /// Whether only the creator client sees this view.
    #[must_use]
    pub const fn owner_only(self) -> bool {
        matches!(self, Self::Invite | Self::End)
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.segment() == segment)
    }
}

/// A parsed navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Home,
    /// `/add-user`
    AddUser,
    /// `/view-sessions`
    ViewSessions,
    /// `/create-session`
    CreateSession,
    /// `/join-session`
    JoinSession,
    /// `/session/{id}` with an optional nested view.
    Session {
        /// Target session.
        id: SessionId,
        /// Nested view; `None` shows the session menu.
        view: Option<SessionView>,
    },
}

impl Route {
    /// Top-level menu entries.
    pub const MENU: [(Self, &'static str); 5] = [
        (Self::Home, "Home"),
        (Self::AddUser, "Add User"),
        (Self::ViewSessions, "View Sessions"),
        (Self::CreateSession, "Create Session"),
        (Self::JoinSession, "Join Session"),
    ];

    /// Parse a path such as `/session/{id}/invite`.
    ///
    /// Trailing slashes, a query string, and a fragment are ignored. Paths
    /// below `/view-sessions/` resolve to [`Route::ViewSessions`].
    ///
    /// # Errors
    ///
    /// Returns invalid request for a malformed session id and not found for
    /// an unknown path.
    pub fn parse(path: &str) -> Result<Self, ClientError> {
        let without_fragment = path.split('#').next().unwrap_or_default();
        let bare = without_fragment.split('?').next().unwrap_or_default().trim();
        let segments: Vec<&str> = bare.split('/').filter(|part| !part.is_empty()).collect();

        match segments.as_slice() {
            [] => Ok(Self::Home),
            ["add-user"] => Ok(Self::AddUser),
            ["view-sessions", ..] => Ok(Self::ViewSessions),
            ["create-session"] => Ok(Self::CreateSession),
            ["join-session"] => Ok(Self::JoinSession),
            ["session", raw_id] => Ok(Self::Session {
                id: parse_session_id(raw_id)?,
                view: None,
            }),
            ["session", raw_id, segment] => {
                let id = parse_session_id(raw_id)?;
                let view = SessionView::from_segment(segment)
                    .ok_or_else(|| unknown_path(path))?;
                Ok(Self::Session {
                    id,
                    view: Some(view),
                })
            }
            _ => Err(unknown_path(path)),
        }
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, ClientError> {
    SessionId::new(raw).map_err(|err| ClientError::invalid_request(format!("{raw:?}: {err}")))
}

fn unknown_path(path: &str) -> ClientError {
    ClientError::not_found(format!("no view at {path}"))
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::AddUser => f.write_str("/add-user"),
            Self::ViewSessions => f.write_str("/view-sessions"),
            Self::CreateSession => f.write_str("/create-session"),
            Self::JoinSession => f.write_str("/join-session"),
            Self::Session { id, view: None } => write!(f, "/session/{id}"),
            Self::Session {
                id,
                view: Some(view),
            } => write!(f, "/session/{id}/{}", view.segment()),
        }
    }
}

/// A link exposed in a session menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    /// Target view.
    pub view: SessionView,
    /// Route to follow.
    pub route: Route,
}

/// Menu of one session as seen by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionNavigation {
    session_id: SessionId,
    is_owner: bool,
    ended: bool,
}

impl SessionNavigation {
    /// Decide the menu for `session_id`.
    #[must_use]
    pub fn new(context: &AppContext, session_id: SessionId, ended: bool) -> Self {
        Self {
            session_id,
            is_owner: context.is_owner(session_id),
            ended,
        }
    }

    /// Whether this client created the session.
    #[must_use]
    pub const fn is_owner(&self) -> bool {
        self.is_owner
    }

    /// Whether `view` is exposed. Once ended, only the candidate list is.
    #[must_use]
    pub const fn allows(&self, view: SessionView) -> bool {
        if self.ended {
            return matches!(view, SessionView::Restaurants);
        }
        self.is_owner || !view.owner_only()
    }

    /// Exposed links in menu order.
    #[must_use]
    pub fn links(&self) -> Vec<NavLink> {
        SessionView::ALL
            .into_iter()
            .filter(|view| self.allows(*view))
            .map(|view| NavLink {
                view,
                route: Route::Session {
                    id: self.session_id,
                    view: Some(view),
                },
            })
            .collect()
    }

    /// Reject navigation to a hidden view.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error naming the hidden view.
    pub fn authorize(&self, view: SessionView) -> Result<(), ClientError> {
        if self.allows(view) {
            return Ok(());
        }
        let reason = if self.ended {
            "the session has ended"
        } else {
            "only the session creator may open it"
        };
        Err(ClientError::forbidden(format!(
            "{} is not available for session {}: {reason}",
            view.label(),
            self.session_id
        )))
    }
}
