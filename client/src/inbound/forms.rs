//! One parameterized form for every input flow.
//!
//! A [`FormSubmission`] declares its fields, sends validated values through
//! a domain flow, and formats the success notice. [`Form`] owns the shared
//! behaviour: required fields are checked before any request, values are
//! cleared on success and kept on failure, and every submission leaves a
//! dismissible [`Notice`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{SessionsApi, UsersApi};
use crate::domain::{
    ClientError, IdentityService, Invite, InviteService, Restaurant, Session, SessionId,
    SessionService, SubmissionService, User,
};

/// One input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key used by [`Form::set`].
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Whether a blank value blocks submission.
    pub required: bool,
}

/// Current field values keyed by [`FieldSpec::name`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<&'static str, String>);

impl FormValues {
    /// Trimmed value of `field`; `None` when blank or unset.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Trimmed value of a field declared as required.
    ///
    /// # Errors
    ///
    /// Returns invalid request when the value is blank.
    pub fn require(&self, field: &str) -> Result<&str, ClientError> {
        self.get(field)
            .ok_or_else(|| ClientError::invalid_request(format!("{field} is required")))
    }
}

/// Outcome category of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The flow succeeded.
    Success,
    /// The flow failed.
    Error,
}

/// Dismissible message left by the last submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Success or failure.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

/// Form-specific behaviour plugged into [`Form`].
#[async_trait]
pub trait FormSubmission: Send + Sync {
    /// Value produced by a successful submission.
    type Output: Send;

    /// Declared fields in display order.
    fn fields(&self) -> &'static [FieldSpec];

    /// Send validated values through the flow.
    async fn send(&self, values: &FormValues) -> Result<Self::Output, ClientError>;

    /// Success notice text.
    fn success_message(&self, output: &Self::Output) -> String;
}

/// Form state around a [`FormSubmission`].
#[derive(Debug)]
pub struct Form<S> {
    submission: S,
    values: FormValues,
    notice: Option<Notice>,
}

impl<S> Form<S>
where
    S: FormSubmission,
{
    /// Empty form.
    pub const fn new(submission: S) -> Self {
        Self {
            submission,
            values: FormValues(BTreeMap::new()),
            notice: None,
        }
    }

    /// Declared fields.
    #[must_use]
    pub fn fields(&self) -> &'static [FieldSpec] {
        self.submission.fields()
    }

    /// Set a field value.
    ///
    /// # Errors
    ///
    /// Returns invalid request when `field` is not declared.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<(), ClientError> {
        let declared = self
            .fields()
            .iter()
            .find(|candidate| candidate.name == field)
            .ok_or_else(|| ClientError::invalid_request(format!("unknown field {field}")))?;
        self.values.0.insert(declared.name, value.into());
        Ok(())
    }

    /// Current values.
    #[must_use]
    pub const fn values(&self) -> &FormValues {
        &self.values
    }

    /// Notice from the last submission.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Dismiss the current notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Validate, send, and record the outcome.
    ///
    /// # Errors
    ///
    /// Returns invalid request naming the first blank required field, or
    /// the flow's error. Values are kept in both cases.
    pub async fn submit(&mut self) -> Result<S::Output, ClientError> {
        let result = match self.missing_field() {
            Some(missing) => Err(ClientError::invalid_request(format!(
                "{} is required",
                missing.label
            ))),
            None => self.submission.send(&self.values).await,
        };
        match result {
            Ok(output) => {
                self.notice = Some(Notice {
                    kind: NoticeKind::Success,
                    message: self.submission.success_message(&output),
                });
                self.values.0.clear();
                Ok(output)
            }
            Err(err) => {
                warn!(code = ?err.code(), error = %err, "form submission failed");
                self.notice = Some(Notice {
                    kind: NoticeKind::Error,
                    message: err.message().to_owned(),
                });
                Err(err)
            }
        }
    }

    fn missing_field(&self) -> Option<&'static FieldSpec> {
        self.fields()
            .iter()
            .find(|candidate| candidate.required && self.values.get(candidate.name).is_none())
    }
}

const REGISTER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name",
        required: true,
    },
    FieldSpec {
        name: "email",
        label: "Email",
        required: false,
    },
];

/// Registration form.
pub struct RegisterForm<U> {
    identity: IdentityService<U>,
}

impl<U> RegisterForm<U> {
    /// Register through `identity`.
    pub const fn new(identity: IdentityService<U>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl<U> FormSubmission for RegisterForm<U>
where
    U: UsersApi,
{
    type Output = User;

    fn fields(&self) -> &'static [FieldSpec] {
        REGISTER_FIELDS
    }

    async fn send(&self, values: &FormValues) -> Result<User, ClientError> {
        self.identity
            .register(values.require("name")?, values.get("email"))
            .await
    }

    fn success_message(&self, output: &User) -> String {
        format!("User {} added with id {}", output.name(), output.id())
    }
}

const INVITE_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "invitee",
    label: "Invitee name",
    required: true,
}];

/// Invite-by-name form for one session.
pub struct InviteForm<U, S> {
    invites: InviteService<U, S>,
    session_id: SessionId,
}

impl<U, S> InviteForm<U, S> {
    /// Invite into `session_id`.
    pub const fn new(invites: InviteService<U, S>, session_id: SessionId) -> Self {
        Self {
            invites,
            session_id,
        }
    }
}

#[async_trait]
impl<U, S> FormSubmission for InviteForm<U, S>
where
    U: UsersApi,
    S: SessionsApi,
{
    type Output = Invite;

    fn fields(&self) -> &'static [FieldSpec] {
        INVITE_FIELDS
    }

    async fn send(&self, values: &FormValues) -> Result<Invite, ClientError> {
        self.invites
            .invite_by_name(self.session_id, values.require("invitee")?)
            .await
    }

    fn success_message(&self, output: &Invite) -> String {
        format!("User invited successfully ({})", output.invitee_id)
    }
}

const SUBMIT_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "restaurant",
    label: "Restaurant name",
    required: true,
}];

/// Candidate submission form for one session.
pub struct SubmitRestaurantForm<S> {
    submissions: SubmissionService<S>,
    session_id: SessionId,
}

impl<S> SubmitRestaurantForm<S> {
    /// Submit into `session_id`.
    pub const fn new(submissions: SubmissionService<S>, session_id: SessionId) -> Self {
        Self {
            submissions,
            session_id,
        }
    }
}

#[async_trait]
impl<S> FormSubmission for SubmitRestaurantForm<S>
where
    S: SessionsApi,
{
    type Output = Restaurant;

    fn fields(&self) -> &'static [FieldSpec] {
        SUBMIT_FIELDS
    }

    async fn send(&self, values: &FormValues) -> Result<Restaurant, ClientError> {
        self.submissions
            .submit(self.session_id, values.require("restaurant")?)
            .await
    }

    fn success_message(&self, output: &Restaurant) -> String {
        format!("Restaurant {} submitted", output.name())
    }
}

const JOIN_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "session",
    label: "Session id",
    required: true,
}];

/// Join-by-id form.
pub struct JoinSessionForm<S> {
    sessions: SessionService<S>,
}

impl<S> JoinSessionForm<S> {
    /// Join through `sessions`.
    pub const fn new(sessions: SessionService<S>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl<S> FormSubmission for JoinSessionForm<S>
where
    S: SessionsApi,
{
    type Output = Session;

    fn fields(&self) -> &'static [FieldSpec] {
        JOIN_FIELDS
    }

    async fn send(&self, values: &FormValues) -> Result<Session, ClientError> {
        let raw = values.require("session")?;
        let session_id = SessionId::new(raw)
            .map_err(|err| ClientError::invalid_request(format!("{raw:?}: {err}")))?;
        self.sessions.join(session_id).await
    }

    fn success_message(&self, output: &Session) -> String {
        format!("Joined session {}", output.id())
    }
}

#[cfg(test)]
mod tests {
    //! Shared form behaviour over a scripted submission.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::ErrorCode;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec {
            name: "title",
            label: "Title",
            required: true,
        },
        FieldSpec {
            name: "note",
            label: "Note",
            required: false,
        },
    ];

    struct Scripted {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FormSubmission for Scripted {
        type Output = String;

        fn fields(&self) -> &'static [FieldSpec] {
            FIELDS
        }

        async fn send(&self, values: &FormValues) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::backend("backend said no"));
            }
            Ok(values.require("title")?.to_owned())
        }

        fn success_message(&self, output: &String) -> String {
            format!("saved {output}")
        }
    }

    fn form(fail: bool) -> (Form<Scripted>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let submission = Scripted {
            fail,
            calls: Arc::clone(&calls),
        };
        (Form::new(submission), calls)
    }

    #[tokio::test]
    async fn success_clears_values_and_leaves_a_notice() {
        let (mut form, _) = form(false);
        form.set("title", "  lunch ").expect("declared");
        let output = form.submit().await.expect("submitted");

        assert_eq!(output, "lunch");
        assert_eq!(form.values(), &FormValues::default());
        assert_eq!(
            form.notice().map(|notice| notice.kind),
            Some(NoticeKind::Success)
        );
        form.dismiss_notice();
        assert!(form.notice().is_none());
    }

    #[tokio::test]
    async fn blank_required_fields_block_the_request() {
        let (mut form, calls) = form(false);
        form.set("title", "   ").expect("declared");
        form.set("note", "kept").expect("declared");
        let err = form.submit().await.expect_err("blank title");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Title is required");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.values().get("note"), Some("kept"));
    }

    #[tokio::test]
    async fn failures_keep_values_and_show_the_backend_message() {
        let (mut form, calls) = form(true);
        form.set("title", "lunch").expect("declared");
        form.submit().await.expect_err("backend fails");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(form.values().get("title"), Some("lunch"));
        let notice = form.notice().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "backend said no");
    }

    #[test]
    fn undeclared_fields_are_rejected() {
        let (mut form, _) = form(false);
        assert!(form.set("colour", "red").is_err());
    }
}
