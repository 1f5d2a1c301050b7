//! Domain types, ports, and flows of the lunch vote client.
//!
//! Purpose: model users, sessions, and candidates as validated values and
//! drive every user-facing flow through the ports in [`ports`]. Nothing in
//! this module knows about HTTP, files, or the terminal.
//!
//! Public surface:
//! - `ClientError` / `ErrorCode`: transport agnostic failure payload.
//! - `AppContext`: identity holder and "created session" marker.
//! - `IdentityService`, `SessionService`, `InviteService`,
//!   `SubmissionService`: one service per flow.
//! - `PollableResource` / `start_polling`: the refreshing candidate list.
//! - `SessionBrowser`: the one-shot session list.

pub mod browse;
pub mod context;
pub mod error;
pub mod identity_service;
pub mod invite_service;
pub mod polling;
pub mod ports;
pub mod restaurant;
pub mod session;
pub mod session_service;
pub mod submission_service;
pub mod user;

pub use self::browse::{BrowseRow, BrowseView, SessionBrowser};
pub use self::context::AppContext;
pub use self::error::{ClientError, ClientErrorValidationError, ErrorCategory, ErrorCode};
pub use self::identity_service::IdentityService;
pub use self::invite_service::InviteService;
pub use self::polling::{
    MIN_POLL_INTERVAL, PollHandle, PollableResource, RestaurantListSource, Snapshot, SnapshotSource, Ticket,
    start_polling,
};
pub use self::restaurant::{Restaurant, RestaurantId, RestaurantName, RestaurantValidationError};
pub use self::session::{EndOutcome, Invite, Session, SessionId, SessionStatus, SessionValidationError};
pub use self::session_service::SessionService;
pub use self::submission_service::SubmissionService;
pub use self::user::{
    AuthToken, EmailAddress, NewUser, Registration, User, UserId, UserName, UserValidationError,
};

/// Result alias used by every flow.
///
/// # Examples
/// ```
/// use lunch_client::domain::{ClientError, ClientResult};
///
/// fn flow() -> ClientResult<()> {
///     Err(ClientError::missing_identity())
/// }
/// assert!(flow().is_err());
/// ```
pub type ClientResult<T> = Result<T, ClientError>;
