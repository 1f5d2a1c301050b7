//! Periodic refresh of a remote resource.
//!
//! Every fetch draws a [`Ticket`] when it is issued. Responses are applied
//! only when their ticket is newer than the one already applied, so a slow
//! response issued earlier can never overwrite a newer snapshot. Fetches may
//! overlap; the poller stops on a terminal value, on [`PollHandle::stop`], or
//! when the handle is dropped, and in every case in-flight fetches are
//! aborted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::domain::ports::SessionsApi;
use crate::domain::session_service::SessionService;
use crate::domain::{ClientError, Session, SessionId};

/// Shortest refresh period the poller runs at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Issue order of a fetch. Later fetches carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Latest state published by a [`PollableResource`].
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    value: Option<T>,
    last_error: Option<ClientError>,
    applied: Option<Ticket>,
}

impl<T> Snapshot<T> {
    const fn empty() -> Self {
        Self {
            value: None,
            last_error: None,
            applied: None,
        }
    }

    /// Last successfully fetched value.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Error from the newest applied fetch, if that fetch failed.
    #[must_use]
    pub const fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Ticket of the newest applied response.
    #[must_use]
    pub const fn applied(&self) -> Option<Ticket> {
        self.applied
    }
}

/// A value refreshed from the backend with apply-if-newer semantics.
#[derive(Debug)]
pub struct PollableResource<T> {
    snapshot: watch::Sender<Snapshot<T>>,
    next_ticket: AtomicU64,
}

impl<T> Default for PollableResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PollableResource<T> {
    /// Create an empty resource.
    #[must_use]
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Snapshot::empty());
        Self {
            snapshot,
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Take the ticket for a fetch that is about to be issued.
    pub fn issue(&self) -> Ticket {
        Ticket(self.next_ticket.fetch_add(1, Ordering::Relaxed))
    }

    /// Apply the outcome of the fetch holding `ticket`.
    ///
    /// Returns `false` and leaves the snapshot untouched when a newer
    /// response was already applied. A failure keeps the last good value.
    pub fn apply(&self, ticket: Ticket, outcome: Result<T, ClientError>) -> bool {
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.applied.is_some_and(|applied| applied >= ticket) {
                return false;
            }
            snapshot.applied = Some(ticket);
            match outcome {
                Ok(value) => {
                    snapshot.value = Some(value);
                    snapshot.last_error = None;
                }
                Err(err) => snapshot.last_error = Some(err),
            }
            true
        })
    }

    /// Watch the snapshot for changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }
}

impl<T: Clone> PollableResource<T> {
    /// Copy of the current snapshot.
    #[must_use]
    pub fn latest(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }
}

/// Something the poller can fetch repeatedly.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    /// Fetched value.
    type Value: Send + Sync + 'static;

    /// Fetch the current value.
    async fn fetch(&self) -> Result<Self::Value, ClientError>;

    /// Whether `value` means no further change can happen.
    fn is_terminal(&self, value: &Self::Value) -> bool;
}

/// Handle to a running poller. Dropping it stops polling.
#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling and wait for the poller to exit.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancellation is the expected outcome here.
            let _cancelled = task.await;
        }
    }

    /// Wait until the poller exits on its own after a terminal value.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.as_mut() {
            if let Err(err) = task.await {
                if err.is_panic() {
                    warn!(error = %err, "poller panicked");
                }
            }
            self.task = None;
        }
    }

    /// Whether the poller has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start refreshing `resource` from `source` every `interval`.
///
/// The first fetch is issued immediately. Intervals shorter than
/// [`MIN_POLL_INTERVAL`] are raised to it. Must be called inside a Tokio
/// runtime.
pub fn start_polling<S>(
    resource: Arc<PollableResource<S::Value>>,
    source: Arc<S>,
    interval: Duration,
) -> PollHandle
where
    S: SnapshotSource,
{
    let period = interval.max(MIN_POLL_INTERVAL);
    let task = tokio::spawn(drive(resource, source, period));
    PollHandle { task: Some(task) }
}

async fn drive<S>(
    resource: Arc<PollableResource<S::Value>>,
    source: Arc<S>,
    interval: Duration,
) where
    S: SnapshotSource,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ticket = resource.issue();
                let fetcher = Arc::clone(&source);
                debug!(ticket = ticket.0, "poll fetch issued");
                in_flight.spawn(async move { (ticket, fetcher.fetch().await) });
            }
            Some(joined) = in_flight.join_next() => {
                let Ok((ticket, outcome)) = joined else {
                    warn!("poll fetch task failed");
                    continue;
                };
                if let Err(err) = &outcome {
                    warn!(ticket = ticket.0, error = %err, "poll fetch failed");
                }
                let terminal = matches!(&outcome, Ok(value) if source.is_terminal(value));
                let applied = resource.apply(ticket, outcome);
                if !applied {
                    debug!(ticket = ticket.0, "stale poll response discarded");
                } else if terminal {
                    debug!(ticket = ticket.0, "terminal value reached; polling stops");
                    break;
                }
            }
        }
    }
    in_flight.abort_all();
}

/// Polls one session's candidate list; terminal once the session ended.
pub struct RestaurantListSource<S> {
    sessions: SessionService<S>,
    session_id: SessionId,
}

impl<S> RestaurantListSource<S> {
    /// Watch `session_id` through `sessions`.
    pub const fn new(sessions: SessionService<S>, session_id: SessionId) -> Self {
        Self {
            sessions,
            session_id,
        }
    }
}

#[async_trait]
impl<S> SnapshotSource for RestaurantListSource<S>
where
    S: SessionsApi + 'static,
{
    type Value = Session;

    async fn fetch(&self) -> Result<Session, ClientError> {
        self.sessions.fetch(self.session_id).await
    }

    fn is_terminal(&self, value: &Session) -> bool {
        value.ended()
    }
}
