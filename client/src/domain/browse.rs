//! One-shot session browsing with inline end actions.

use tracing::{debug, warn};

use crate::domain::ports::SessionsApi;
use crate::domain::session_service::SessionService;
use crate::domain::{ClientError, EndOutcome, Session};

/// One listed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRow {
    /// The session as listed, with local outcomes applied.
    pub session: Session,
    /// Whether this client created the session.
    pub is_owner: bool,
}

/// Result of a single listing. Not refreshed automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseView {
    /// Rows in backend order.
    pub rows: Vec<BrowseRow>,
}

/// Loads the session list and ends sessions from it.
#[derive(Clone)]
pub struct SessionBrowser<S> {
    sessions: SessionService<S>,
}

impl<S> SessionBrowser<S> {
    /// Browse through `sessions`.
    pub const fn new(sessions: SessionService<S>) -> Self {
        Self { sessions }
    }
}

impl<S> SessionBrowser<S>
where
    S: SessionsApi,
{
    /// List sessions once.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn load(&self) -> Result<BrowseView, ClientError> {
        let rows = self
            .sessions
            .list()
            .await?
            .into_iter()
            .map(|session| BrowseRow {
                is_owner: self.sessions.context().is_owner(session.id()),
                session,
            })
            .collect::<Vec<_>>();
        debug!(count = rows.len(), "sessions listed");
        Ok(BrowseView { rows })
    }

    /// End the session in row `index` and mark the row ended.
    ///
    /// # Errors
    ///
    /// Fails with invalid request for an unknown row and with forbidden for
    /// a row this client did not create or that already ended. Otherwise
    /// as [`SessionService::end_session`].
    pub async fn end_row(
        &self,
        view: &mut BrowseView,
        index: usize,
    ) -> Result<EndOutcome, ClientError> {
        let Some(row) = view.rows.get_mut(index) else {
            warn!(index, "end requested for an unknown row");
            return Err(ClientError::invalid_request(format!(
                "no session listed at position {index}"
            )));
        };
        if !row.is_owner {
            warn!(session_id = %row.session.id(), "end requested by a non-owner");
            return Err(ClientError::forbidden("Only the session creator can end it"));
        }
        if row.session.ended() {
            warn!(session_id = %row.session.id(), "end requested for an ended session");
            return Err(ClientError::forbidden("Voting has already closed"));
        }
        let outcome = self.sessions.end_session(row.session.id()).await?;
        row.session = row.session.clone().into_ended(outcome.winner.clone());
        Ok(outcome)
    }
}
