//! The watch loop: one bounded watch session per external trigger.
//!
//! A session moves `Idle -> Connecting -> Streaming -> Idle`. It never retries on
//! its own; the scheduler's next trigger starts a fresh session.

use std::sync::Arc;
use std::time::Duration;

use error_stack::Report;
use futures::StreamExt;
use tokio::time::Instant;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::domain::classifier::classify;
use crate::domain::error::ClusterError;
use crate::domain::scope::ScopeConfig;
use crate::domain::traits::ClusterReader;
use crate::domain::traits::NotificationSink;
use crate::domain::types::ChangeEvent;
use crate::domain::types::ChangeKind;
use crate::domain::types::SubscriptionScope;

/// Default server-side lifetime of a watch session.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack on top of the session timeout before the client stops waiting for the
/// server to close the stream.
const WATCH_DEADLINE_GRACE: Duration = Duration::from_secs(5);

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// No connection could be established; nothing was streamed.
    ConnectFailed,
    /// The stream reached its deliberate timeout.
    TimedOut,
    /// The stream broke or credentials expired mid-session.
    Interrupted,
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub events: usize,
    pub malformed_events: usize,
    pub notifications: usize,
    pub delivery_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub scope: SubscriptionScope,
    pub outcome: SessionOutcome,
    pub stats: SessionStats,
}

/// Runs watch sessions against a cluster reader, forwarding notifications to a sink.
///
/// Cloning is cheap; clones share the reader and the sink but every session owns
/// its own connection handle, so sessions may overlap freely.
pub struct WatchLoop<R, S> {
    reader: Arc<R>,
    sink: Arc<S>,
    scope_config: ScopeConfig,
    session_timeout: Duration,
}

impl<R, S> Clone for WatchLoop<R, S> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            sink: self.sink.clone(),
            scope_config: self.scope_config.clone(),
            session_timeout: self.session_timeout,
        }
    }
}

impl<R, S> WatchLoop<R, S>
where
    R: ClusterReader,
    S: NotificationSink,
{
    pub fn new(
        reader: Arc<R>,
        sink: Arc<S>,
        scope_config: ScopeConfig,
        session_timeout: Duration,
    ) -> Self {
        Self {
            reader,
            sink,
            scope_config,
            session_timeout,
        }
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    /// Run one complete session: resolve the scope, connect, stream until the
    /// session ends, and report how it went.
    ///
    /// Never fails; every error is logged and reflected in the returned outcome.
    pub async fn run_session(&self) -> SessionReport {
        let scope = self.scope_config.resolve();
        self.run_scoped(scope).await
    }

    #[tracing::instrument(skip(self, scope), fields(scope = %scope))]
    async fn run_scoped(&self, scope: SubscriptionScope) -> SessionReport {
        let mut stats = SessionStats::default();

        let handle = match self.reader.connect().await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to connect to cluster, skipping session: {e:?}");
                return SessionReport {
                    scope,
                    outcome: SessionOutcome::ConnectFailed,
                    stats,
                };
            }
        };

        info!("Watching pods");
        let outcome = match self.stream(&handle, &scope, &mut stats).await {
            Ok(()) => {
                info!(
                    events = stats.events,
                    notifications = stats.notifications,
                    "Watch session timed out"
                );
                SessionOutcome::TimedOut
            }
            Err(e) => {
                warn!(
                    events = stats.events,
                    notifications = stats.notifications,
                    "Watch session interrupted: {e:?}"
                );
                SessionOutcome::Interrupted
            }
        };

        SessionReport {
            scope,
            outcome,
            stats,
        }
    }

    /// Replay the current pods as `Added` events, then follow the watch from the
    /// listed version until it ends.
    async fn stream(
        &self,
        handle: &R::Handle,
        scope: &SubscriptionScope,
        stats: &mut SessionStats,
    ) -> Result<(), Report<ClusterError>> {
        let snapshot = self.reader.list(handle, scope).await?;
        debug!(
            pods = snapshot.pods.len(),
            resource_version = ?snapshot.resource_version,
            "Listed current pods"
        );
        for pod in snapshot.pods {
            let event = ChangeEvent {
                kind: ChangeKind::Added,
                subject: pod,
            };
            self.process(&event, stats).await;
        }

        let mut events = self
            .reader
            .watch(
                handle,
                scope,
                snapshot.resource_version.as_deref(),
                self.session_timeout,
            )
            .await?;

        let deadline = Instant::now() + self.session_timeout + WATCH_DEADLINE_GRACE;
        loop {
            match tokio::time::timeout_at(deadline, events.next()).await {
                Err(_) => {
                    debug!("Watch stream outlived its timeout, closing it");
                    return Ok(());
                }
                Ok(None) => return Ok(()),
                Ok(Some(Ok(event))) => self.process(&event, stats).await,
                Ok(Some(Err(e))) => {
                    if !matches!(e.current_context(), ClusterError::MalformedEvent { .. }) {
                        return Err(e);
                    }
                    stats.malformed_events += 1;
                    warn!("Dropping pod event: {e:?}");
                }
            }
        }
    }

    async fn process(&self, event: &ChangeEvent, stats: &mut SessionStats) {
        stats.events += 1;
        debug!(
            kind = %event.kind,
            pod = %event.subject.identity,
            phase = %event.subject.phase,
            "Pod event"
        );

        for notification in classify(event) {
            stats.notifications += 1;
            info!(pod = %notification.pod, "{}", notification.summary);
            if let Err(e) = self.sink.send(&notification).await {
                stats.delivery_failures += 1;
                warn!(pod = %notification.pod, "Failed to send notification: {e:?}");
            }
        }
    }
}
