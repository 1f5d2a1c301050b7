//! Reqwest-backed adapter for the lunch backend.
//!
//! This adapter owns transport details only: endpoint construction, the
//! API key and bearer headers, HTTP status mapping, and JSON decoding into
//! domain values.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    AddRestaurantBody, EndSessionBody, InviteBody, RegisterUserBody, RestaurantRef, SessionDto,
    UserDto, parse_end_outcome, sessions_from_rows,
};
use crate::domain::ports::{CredentialSource, SessionsApi, UsersApi};
use crate::domain::{
    AuthToken, ClientError, EndOutcome, Invite, NewUser, Registration, RestaurantName, Session,
    SessionId, User, UserId, UserName,
};

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Path templates for every backend endpoint.
///
/// `{id}` is replaced by the session id and `{name}` by the user name; both
/// are percent-encoded as single path segments. A user lookup template
/// without `{name}` switches to the query form `?name=` returning a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPaths {
    /// `POST` registration.
    pub register: String,
    /// `GET` user lookup by name.
    pub user_lookup: String,
    /// `POST` session creation; `creatorId` is sent as a query parameter.
    pub create_session: String,
    /// `GET` session listing.
    pub list_sessions: String,
    /// `GET` one session.
    pub session: String,
    /// `POST` invite.
    pub invite: String,
    /// `POST` candidate submission.
    pub add_restaurant: String,
    /// `POST` end of voting.
    pub end_session: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            register: "/users".to_owned(),
            user_lookup: "/users/name/{name}".to_owned(),
            create_session: "/sessions/create".to_owned(),
            list_sessions: "/sessions".to_owned(),
            session: "/sessions/{id}".to_owned(),
            invite: "/sessions/{id}/invite".to_owned(),
            add_restaurant: "/sessions/{id}/restaurants".to_owned(),
            end_session: "/sessions/{id}/end".to_owned(),
        }
    }
}

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Scheme, host, and optional path prefix of the backend.
    pub base_url: Url,
    /// Value for [`API_KEY_HEADER`], when the backend requires one.
    pub api_key: Option<String>,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Endpoint templates.
    pub paths: EndpointPaths,
}

impl HttpBackendConfig {
    /// Default endpoints at `base_url` with no key and no timeout.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
            timeout: None,
            paths: EndpointPaths::default(),
        }
    }
}

/// [`UsersApi`] and [`SessionsApi`] over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    paths: EndpointPaths,
    credentials: Arc<dyn CredentialSource>,
}

impl HttpBackend {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or
    /// the base URL cannot carry paths.
    pub fn new(
        config: HttpBackendConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ClientError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ClientError::invalid_request(format!(
                "base url {} cannot carry paths",
                config.base_url
            )));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ClientError::internal(format!("building HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
            paths: config.paths,
            credentials,
        })
    }

    fn url(&self, template: &str, session_id: Option<SessionId>, name: Option<&str>) -> Url {
        let id = session_id.map(|id| id.to_string());
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for segment in template.split('/').filter(|segment| !segment.is_empty()) {
                let rendered = match segment {
                    "{id}" => id.as_deref().unwrap_or(segment),
                    "{name}" => name.unwrap_or(segment),
                    literal => literal,
                };
                segments.push(rendered);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "backend request");
        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key.as_str());
        }
        if let Some(token) = self.credentials.bearer_token() {
            builder = builder.bearer_auth(token.expose());
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(HeaderMap, Vec<u8>), ClientError> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok((headers, body.to_vec()))
    }

    async fn fetch_session(&self, url: Url) -> Result<Session, ClientError> {
        let builder = self.request(Method::GET, url);
        let (_, body) = self.send(builder).await?;
        let dto: SessionDto = decode(&body, "session")?;
        dto.into_domain().map_err(ClientError::transport)
    }

    async fn lookup_by_path(&self, name: &UserName) -> Result<User, ClientError> {
        let url = self.url(&self.paths.user_lookup, None, Some(name.as_ref()));
        let builder = self.request(Method::GET, url);
        let (_, body) = self.send(builder).await.map_err(|err| not_found_for(err, name))?;
        if is_blank(&body) {
            return Err(user_not_found(name));
        }
        let dto: UserDto = decode(&body, "user")?;
        dto.into_domain().map_err(ClientError::transport)
    }

    async fn lookup_by_query(&self, name: &UserName) -> Result<User, ClientError> {
        let mut url = self.url(&self.paths.user_lookup, None, None);
        url.query_pairs_mut().append_pair("name", name.as_ref());
        let builder = self.request(Method::GET, url);
        let (_, body) = self.send(builder).await.map_err(|err| not_found_for(err, name))?;
        if is_blank(&body) {
            return Err(user_not_found(name));
        }
        let candidates: Vec<UserDto> = decode(&body, "user list")?;
        candidates
            .into_iter()
            .find(|candidate| candidate.name.trim() == name.as_ref())
            .ok_or_else(|| user_not_found(name))?
            .into_domain()
            .map_err(ClientError::transport)
    }
}

#[async_trait]
impl UsersApi for HttpBackend {
    async fn register(&self, new_user: &NewUser) -> Result<Registration, ClientError> {
        let url = self.url(&self.paths.register, None, None);
        let body = RegisterUserBody {
            name: new_user.name.as_ref(),
            email: new_user.email.as_ref().map(AsRef::as_ref),
        };
        let builder = self.request(Method::POST, url).json(&body);
        let (headers, raw) = self.send(builder).await?;
        let dto: UserDto = decode(&raw, "user")?;

        let header_token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| AuthToken::new(value).ok());
        let token = header_token.or_else(|| dto.body_token().and_then(|raw| AuthToken::new(raw).ok()));
        let user = dto.into_domain().map_err(ClientError::transport)?;
        Ok(Registration { user, token })
    }

    async fn find_user_by_name(&self, name: &UserName) -> Result<User, ClientError> {
        if self.paths.user_lookup.contains("{name}") {
            self.lookup_by_path(name).await
        } else {
            self.lookup_by_query(name).await
        }
    }
}

#[async_trait]
impl SessionsApi for HttpBackend {
    async fn create_session(&self, creator: &UserId) -> Result<Session, ClientError> {
        let mut url = self.url(&self.paths.create_session, None, None);
        url.query_pairs_mut()
            .append_pair("creatorId", &creator.to_string());
        let builder = self.request(Method::POST, url);
        let (_, body) = self.send(builder).await?;
        let dto: SessionDto = decode(&body, "session")?;
        dto.into_domain().map_err(ClientError::transport)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        let url = self.url(&self.paths.list_sessions, None, None);
        let builder = self.request(Method::GET, url);
        let (_, body) = self.send(builder).await?;
        if is_blank(&body) {
            return Ok(Vec::new());
        }
        let rows: Vec<serde_json::Value> = decode(&body, "session list")?;
        Ok(sessions_from_rows(rows))
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session, ClientError> {
        let url = self.url(&self.paths.session, Some(session_id), None);
        self.fetch_session(url).await
    }

    async fn invite(&self, invite: &Invite) -> Result<(), ClientError> {
        let url = self.url(&self.paths.invite, Some(invite.session_id), None);
        let body = InviteBody {
            inviter_id: invite.inviter_id.to_string(),
            invitee_id: invite.invitee_id.to_string(),
        };
        self.send(self.request(Method::POST, url).json(&body))
            .await
            .map(|_| ())
    }

    async fn add_restaurant(
        &self,
        session_id: SessionId,
        submitter: &UserId,
        name: &RestaurantName,
    ) -> Result<(), ClientError> {
        let url = self.url(&self.paths.add_restaurant, Some(session_id), None);
        let body = AddRestaurantBody {
            user_id: submitter.to_string(),
            restaurant_name: name.as_ref(),
            restaurant: RestaurantRef {
                name: name.as_ref(),
            },
        };
        self.send(self.request(Method::POST, url).json(&body))
            .await
            .map(|_| ())
    }

    async fn end_session(
        &self,
        session_id: SessionId,
        user: &UserId,
    ) -> Result<EndOutcome, ClientError> {
        let url = self.url(&self.paths.end_session, Some(session_id), None);
        let body = EndSessionBody {
            user_id: user.to_string(),
        };
        let (_, raw) = self
            .send(self.request(Method::POST, url).json(&body))
            .await?;
        Ok(parse_end_outcome(&raw))
    }
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|err| {
        ClientError::transport(format!("invalid {what} payload: {err}"))
            .with_details(serde_json::json!({ "body": body_preview(body) }))
    })
}

fn is_blank(body: &[u8]) -> bool {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed == "null"
}

fn user_not_found(name: &UserName) -> ClientError {
    ClientError::not_found(format!("no user named {name}"))
}

fn not_found_for(err: ClientError, name: &UserName) -> ClientError {
    if err.status() == Some(StatusCode::NOT_FOUND.as_u16()) {
        user_not_found(name).with_status(StatusCode::NOT_FOUND.as_u16())
    } else {
        err
    }
}

fn map_transport_error(error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::transport(format!("request timed out: {error}"))
    } else if error.is_decode() {
        ClientError::transport(format!("unreadable response: {error}"))
    } else {
        ClientError::transport(format!("backend unreachable: {error}"))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ClientError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("backend returned status {}", status.as_u16())
    } else {
        preview
    };

    let error = match status {
        StatusCode::BAD_REQUEST => ClientError::invalid_request(message),
        StatusCode::UNAUTHORIZED => ClientError::unauthorized(message),
        StatusCode::FORBIDDEN => ClientError::forbidden(message),
        StatusCode::NOT_FOUND => ClientError::not_found(message),
        StatusCode::CONFLICT => ClientError::conflict(message),
        _ if status.is_client_error() => ClientError::invalid_request(message),
        _ => ClientError::backend(message),
    };
    error.with_status(status.as_u16())
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::NoCredentials;
    use rstest::rstest;

    fn backend(base: &str) -> HttpBackend {
        let config = HttpBackendConfig::new(Url::parse(base).expect("base url"));
        HttpBackend::new(config, Arc::new(NoCredentials)).expect("client builds")
    }

    #[rstest]
    #[case::bad_request(StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest)]
    #[case::unauthorized(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)]
    #[case::forbidden(StatusCode::FORBIDDEN, ErrorCode::Forbidden)]
    #[case::not_found(StatusCode::NOT_FOUND, ErrorCode::NotFound)]
    #[case::conflict(StatusCode::CONFLICT, ErrorCode::Conflict)]
    #[case::teapot(StatusCode::IM_A_TEAPOT, ErrorCode::InvalidRequest)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Backend)]
    #[case::unavailable(StatusCode::SERVICE_UNAVAILABLE, ErrorCode::Backend)]
    fn maps_http_statuses_to_error_codes(#[case] status: StatusCode, #[case] expected: ErrorCode) {
        let error = map_status_error(status, b"Session not found");
        assert_eq!(error.code(), expected);
        assert_eq!(error.status(), Some(status.as_u16()));
        assert_eq!(error.message(), "Session not found");
    }

    #[test]
    fn empty_error_bodies_fall_back_to_the_status() {
        let error = map_status_error(StatusCode::INTERNAL_SERVER_ERROR, b"  ");
        assert_eq!(error.message(), "backend returned status 500");
    }

    #[test]
    fn previews_are_compacted_and_truncated() {
        let long = format!("a  b\n{}", "x".repeat(400));
        let preview = body_preview(long.as_bytes());
        assert!(preview.starts_with("a b x"));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
    }

    #[rstest]
    #[case("http://localhost:8080", "/sessions/{id}/invite", "http://localhost:8080/sessions/3fa85f64-5717-4562-b3fc-2c963f66afa6/invite")]
    #[case("http://localhost:8080/api/", "/sessions/{id}", "http://localhost:8080/api/sessions/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn templates_render_under_the_base_path(
        #[case] base: &str,
        #[case] template: &str,
        #[case] expected: &str,
    ) {
        let id = SessionId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("id");
        assert_eq!(backend(base).url(template, Some(id), None).as_str(), expected);
    }

    #[test]
    fn names_are_encoded_as_one_segment() {
        let url = backend("http://localhost:8080").url("/users/name/{name}", None, Some("Ada L/x"));
        assert_eq!(url.as_str(), "http://localhost:8080/users/name/Ada%20L%2Fx");
    }

    #[test]
    fn blank_bodies_include_json_null() {
        assert!(is_blank(b""));
        assert!(is_blank(b" null \n"));
        assert!(!is_blank(b"{}"));
    }
}
