//! Routes requests to flows and renders the result.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::ports::{SessionsApi, UsersApi};
use crate::domain::{
    AppContext, ClientError, IdentityService, InviteService, PollableResource,
    RestaurantListSource, Session, SessionBrowser, SessionId, SessionService, Snapshot,
    SubmissionService, UserId, start_polling,
};
use crate::inbound::forms::{
    Form, FormSubmission, InviteForm, JoinSessionForm, RegisterForm, SubmitRestaurantForm,
};
use crate::inbound::navigation::{Route, SessionNavigation, SessionView};
use crate::inbound::render;

/// What the shell produced for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show.
    Shown(String),
    /// Text to show after moving to `route`.
    Navigated {
        /// Rendered target view.
        text: String,
        /// Where the client now is.
        route: Route,
    },
    /// The caller should run [`Shell::watch`] for this session.
    Watch(SessionId),
}

enum FormRun<T> {
    Prompt(String),
    Done { output: T, text: String },
}

/// Navigation shell over the two backend ports.
pub struct Shell<U, S> {
    users: Arc<U>,
    sessions: Arc<S>,
    context: Arc<AppContext>,
    poll_interval: Duration,
}

impl<U, S> Shell<U, S>
where
    U: UsersApi + 'static,
    S: SessionsApi + 'static,
{
    /// Build a shell.
    pub const fn new(
        users: Arc<U>,
        sessions: Arc<S>,
        context: Arc<AppContext>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            context,
            poll_interval,
        }
    }

    fn session_service(&self) -> SessionService<S> {
        SessionService::new(Arc::clone(&self.sessions), Arc::clone(&self.context))
    }

    /// Open `route`, submitting `fields` when it hosts a form.
    ///
    /// A form route opened without fields shows its field list instead.
    ///
    /// # Errors
    ///
    /// Returns routing, gating, validation, and backend errors unchanged.
    pub async fn navigate(
        &self,
        route: Route,
        fields: &[(String, String)],
    ) -> Result<Outcome, ClientError> {
        debug!(%route, fields = fields.len(), "navigating");
        match route {
            Route::Home => {
                let identity = self.context.current_user_id().map(String::from);
                Ok(Outcome::Shown(render::home(identity.as_deref())))
            }
            Route::AddUser => {
                let identity = IdentityService::new(Arc::clone(&self.users), Arc::clone(&self.context));
                run_form("Add user", RegisterForm::new(identity), fields)
                    .await
                    .map(shown)
            }
            Route::CreateSession => self.create_session(fields).await,
            Route::JoinSession => {
                let form = JoinSessionForm::new(self.session_service());
                match run_form("Join session", form, fields).await? {
                    FormRun::Prompt(text) => Ok(Outcome::Shown(text)),
                    FormRun::Done { output, text } => Ok(self.enter(&output, &text)),
                }
            }
            Route::ViewSessions => self.view_sessions(fields).await,
            Route::Session { id, view } => self.session_view(id, view, fields).await,
        }
    }

    async fn create_session(&self, fields: &[(String, String)]) -> Result<Outcome, ClientError> {
        let creator = lookup(fields, "creator")
            .map(|raw| {
                UserId::new(raw).map_err(|err| ClientError::invalid_request(format!("{raw:?}: {err}")))
            })
            .transpose()?;
        let session = self.session_service().create_session(creator).await?;
        Ok(self.enter(&session, &format!("Session {} created", session.id())))
    }

    async fn view_sessions(&self, fields: &[(String, String)]) -> Result<Outcome, ClientError> {
        let browser = SessionBrowser::new(self.session_service());
        let mut view = browser.load().await?;
        let Some(raw) = lookup(fields, "end") else {
            return Ok(Outcome::Shown(render::browse(&view)));
        };
        let index = raw
            .parse::<usize>()
            .map_err(|err| ClientError::invalid_request(format!("end position {raw:?}: {err}")))?;
        let outcome = browser.end_row(&mut view, index).await?;
        let ended = view
            .rows
            .get(index)
            .map(|row| render::end_outcome(row.session.id(), &outcome))
            .unwrap_or_default();
        Ok(Outcome::Shown(format!("{ended}\n{}", render::browse(&view))))
    }

    async fn session_view(
        &self,
        session_id: SessionId,
        view: Option<SessionView>,
        fields: &[(String, String)],
    ) -> Result<Outcome, ClientError> {
        let session = self.session_service().fetch(session_id).await?;
        let navigation = SessionNavigation::new(&self.context, session_id, session.ended());
        let Some(view) = view else {
            return Ok(Outcome::Shown(render::session_menu(&session, &navigation)));
        };
        navigation.authorize(view)?;
        match view {
            SessionView::Invite => {
                let invites = InviteService::new(
                    Arc::clone(&self.users),
                    Arc::clone(&self.sessions),
                    Arc::clone(&self.context),
                );
                let form = InviteForm::new(invites, session_id);
                run_form("Invite a participant", form, fields)
                    .await
                    .map(shown)
            }
            SessionView::SubmitRestaurant => {
                let submissions =
                    SubmissionService::new(Arc::clone(&self.sessions), Arc::clone(&self.context));
                let form = SubmitRestaurantForm::new(submissions, session_id);
                run_form("Submit a restaurant", form, fields)
                    .await
                    .map(shown)
            }
            SessionView::End => {
                let outcome = self.session_service().end_session(session_id).await?;
                Ok(Outcome::Shown(render::end_outcome(session_id, &outcome)))
            }
            SessionView::Restaurants => Ok(Outcome::Watch(session_id)),
        }
    }

    fn enter(&self, session: &Session, notice: &str) -> Outcome {
        let navigation = SessionNavigation::new(&self.context, session.id(), session.ended());
        let menu = render::session_menu(session, &navigation);
        let route = Route::Session {
            id: session.id(),
            view: None,
        };
        info!(%route, "entered session");
        Outcome::Navigated {
            text: format!("{notice}\n{menu}"),
            route,
        }
    }

    /// Follow the candidate list of `session_id`.
    ///
    /// `on_update` sees every applied snapshot. Returns once the session
    /// ends or `shutdown` resolves; the poller is stopped in both cases.
    pub async fn watch<F, C>(
        &self,
        session_id: SessionId,
        shutdown: F,
        mut on_update: C,
    ) -> Snapshot<Session>
    where
        F: Future<Output = ()>,
        C: FnMut(&Snapshot<Session>),
    {
        let resource = Arc::new(PollableResource::new());
        let mut updates = resource.subscribe();
        let source = Arc::new(RestaurantListSource::new(self.session_service(), session_id));
        let mut handle = start_polling(Arc::clone(&resource), source, self.poll_interval);
        info!(session_id = %session_id, "watching candidates");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    on_update(&snapshot);
                }
                () = handle.finished() => break,
                () = &mut shutdown => {
                    debug!(session_id = %session_id, "watch interrupted");
                    break;
                }
            }
        }

        if updates.has_changed().unwrap_or(false) {
            let snapshot = updates.borrow_and_update().clone();
            on_update(&snapshot);
        }
        handle.stop().await;
        resource.latest()
    }
}

async fn run_form<F>(
    title: &str,
    submission: F,
    fields: &[(String, String)],
) -> Result<FormRun<F::Output>, ClientError>
where
    F: FormSubmission,
{
    let mut form = Form::new(submission);
    if fields.is_empty() {
        return Ok(FormRun::Prompt(render::form(title, form.fields())));
    }
    for (name, value) in fields {
        form.set(name, value.as_str())?;
    }
    let output = form.submit().await?;
    let text = form.notice().map(render::notice).unwrap_or_default();
    Ok(FormRun::Done { output, text })
}

fn shown<T>(run: FormRun<T>) -> Outcome {
    match run {
        FormRun::Prompt(text) | FormRun::Done { text, .. } => Outcome::Shown(text),
    }
}

fn lookup<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
