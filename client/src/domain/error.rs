//! Client-level error type shared by every flow.
//!
//! Errors are transport agnostic. The HTTP adapter maps status codes and
//! connectivity failures onto [`ErrorCode`]; the command-line shell renders
//! the message as a dismissible notice.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ports::ClientStateStoreError;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A required field is missing or malformed.
    InvalidRequest,
    /// No identity is stored; the user must register first.
    MissingIdentity,
    /// The requested resource does not exist.
    NotFound,
    /// The backend rejected the credentials.
    Unauthorized,
    /// The action is not permitted for this user.
    Forbidden,
    /// The action conflicts with the current resource state.
    Conflict,
    /// The backend answered with an unexpected failure status.
    Backend,
    /// The backend could not be reached or the response was unreadable.
    Transport,
    /// An unexpected error occurred inside the client.
    InternalError,
}

/// Coarse error taxonomy used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caught locally before any request was issued.
    Validation,
    /// A lookup produced no match.
    NotFound,
    /// The backend or the network failed.
    Backend,
}

impl ErrorCode {
    /// Map the code onto the reporting taxonomy.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::InvalidRequest | Self::MissingIdentity | Self::Forbidden => {
                ErrorCategory::Validation
            }
            Self::NotFound => ErrorCategory::NotFound,
            Self::Unauthorized
            | Self::Conflict
            | Self::Backend
            | Self::Transport
            | Self::InternalError => ErrorCategory::Backend,
        }
    }
}

/// Error payload returned by client flows.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use lunch_client::domain::{ClientError, ErrorCode};
///
/// let err = ClientError::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientError {
    code: ErrorCode,
    message: String,
    status: Option<u16>,
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientErrorValidationError {
    /// The message was blank.
    EmptyMessage,
}

impl std::fmt::Display for ClientErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ClientErrorValidationError {}

const FALLBACK_MESSAGE: &str = "an unknown error occurred";

impl ClientError {
    /// Create a new error; blank messages are replaced with a generic one.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: FALLBACK_MESSAGE.to_owned(),
            status: None,
            details: None,
        })
    }

    /// Fallible constructor that validates the message content.
    ///
    /// # Errors
    ///
    /// Returns [`ClientErrorValidationError::EmptyMessage`] for blank text.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ClientErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ClientErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            status: None,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Reporting category derived from the code.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// HTTP status reported by the backend, when the error came from one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Supplementary structured details.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use lunch_client::domain::ClientError;
    /// use serde_json::json;
    ///
    /// let err = ClientError::invalid_request("bad")
    ///     .with_details(json!({ "field": "restaurantName" }));
    /// assert!(err.details().is_some());
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Record the backend status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Error raised when a flow needs an identity and none is stored.
    #[must_use]
    pub fn missing_identity() -> Self {
        Self::new(
            ErrorCode::MissingIdentity,
            "no user identity stored; register a user first",
        )
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::Backend`].
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Backend, message)
    }

    /// Convenience constructor for [`ErrorCode::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transport, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClientError {}

impl From<ClientStateStoreError> for ClientError {
    fn from(error: ClientStateStoreError) -> Self {
        Self::internal(error.to_string())
    }
}
