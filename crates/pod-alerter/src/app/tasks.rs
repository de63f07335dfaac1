use std::time::Duration;

use tokio::task::JoinError;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::domain::session::SessionReport;
use crate::domain::session::WatchLoop;
use crate::domain::traits::ClusterReader;
use crate::domain::traits::NotificationSink;

/// Time in-flight sessions get to finish once shutdown is requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Triggers watch sessions: once at startup, then on every interval tick.
///
/// Each trigger spawns an independent session. A session that outlives the
/// interval keeps running alongside the next one.
pub struct Scheduler<R, S> {
    watch_loop: WatchLoop<R, S>,
    interval: Duration,
    sessions: JoinSet<SessionReport>,
    cancellation_token: CancellationToken,
}

impl<R, S> Scheduler<R, S>
where
    R: ClusterReader + 'static,
    S: NotificationSink + 'static,
{
    pub fn new(watch_loop: WatchLoop<R, S>, interval: Duration) -> Self {
        Self {
            watch_loop,
            interval,
            sessions: JoinSet::new(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Token that stops the scheduler when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Trigger sessions until cancelled, then wait briefly for running sessions.
    pub async fn run(&mut self) {
        tracing::info!(
            interval = ?self.interval,
            session_timeout = ?self.watch_loop.session_timeout(),
            "Scheduling watch sessions"
        );

        // The first tick completes immediately and acts as the startup trigger.
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Scheduler shutdown requested");
                    break;
                }
                _ = ticker.tick() => self.trigger(),
                Some(result) = self.sessions.join_next() => reap(result),
            }
        }

        self.wait_for_sessions_with_timeout(SHUTDOWN_GRACE).await;
    }

    fn trigger(&mut self) {
        let watch_loop = self.watch_loop.clone();
        let session = async move { watch_loop.run_session().await };
        self.sessions.spawn(session);
        tracing::debug!(
            active_sessions = self.sessions.len(),
            "Triggered watch session"
        );
    }

    async fn wait_for_sessions_with_timeout(&mut self, timeout: Duration) {
        let sessions = &mut self.sessions;
        tokio::time::timeout(timeout, async {
            while let Some(result) = sessions.join_next().await {
                reap(result);
            }
        })
        .await
        .unwrap_or_else(|_| {
            tracing::warn!(
                "{} watch sessions still running after {:?}, aborting",
                sessions.len(),
                timeout
            );
            sessions.abort_all();
        });
    }
}

fn reap(result: Result<SessionReport, JoinError>) {
    match result {
        Ok(report) => tracing::debug!(
            scope = %report.scope,
            outcome = ?report.outcome,
            stats = ?report.stats,
            "Watch session finished"
        ),
        Err(e) if e.is_cancelled() => {}
        Err(e) => tracing::error!("Watch session task failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;
    use crate::domain::mock::pod;
    use crate::domain::mock::FakeReader;
    use crate::domain::mock::RecordingSink;
    use crate::domain::scope::ScopeConfig;
    use crate::domain::session::DEFAULT_SESSION_TIMEOUT;
    use crate::domain::types::PodPhase;

    fn scheduler(
        reader: FakeReader,
        interval: Duration,
    ) -> (Scheduler<FakeReader, RecordingSink>, Arc<FakeReader>, Arc<RecordingSink>) {
        let reader = Arc::new(reader);
        let sink = Arc::new(RecordingSink::default());
        let watch_loop = WatchLoop::new(
            reader.clone(),
            sink.clone(),
            ScopeConfig::default(),
            DEFAULT_SESSION_TIMEOUT,
        );
        (Scheduler::new(watch_loop, interval), reader, sink)
    }

    #[test(tokio::test(start_paused = true))]
    async fn runs_at_startup_and_on_every_tick() {
        let reader = FakeReader {
            snapshot: vec![pod("stuck", PodPhase::Failed, &[])],
            ..Default::default()
        };
        let (mut scheduler, reader, sink) = scheduler(reader, Duration::from_secs(30));
        let token = scheduler.cancellation_token();
        let handle = tokio::spawn(async move { scheduler.run().await });

        tokio::time::sleep(Duration::from_secs(65)).await;
        token.cancel();
        handle.await.unwrap();

        // Startup, then ticks at 30s and 60s.
        assert_eq!(reader.connect_count(), 3);
        assert_eq!(sink.summaries().len(), 3);
    }

    #[test(tokio::test(start_paused = true))]
    async fn sessions_may_overlap() {
        let reader = FakeReader {
            hang: true,
            ..Default::default()
        };
        let (mut scheduler, reader, _) = scheduler(reader, Duration::from_secs(5));
        let token = scheduler.cancellation_token();
        let handle = tokio::spawn(async move { scheduler.run().await });

        // Hanging sessions last 15s, so triggers at 0s, 5s and 10s are all still open.
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(reader.connect_count(), 3);
        assert_eq!(reader.watched.lock().unwrap().len(), 3);

        token.cancel();
        handle.await.unwrap();
    }

    #[test(tokio::test(start_paused = true))]
    async fn shutdown_aborts_sessions_after_grace_period() {
        let reader = FakeReader {
            hang: true,
            ..Default::default()
        };
        let (mut scheduler, _, _) = scheduler(reader, Duration::from_secs(30));
        let token = scheduler.cancellation_token();
        let handle = tokio::spawn(async move { scheduler.run().await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        let cancelled_at = tokio::time::Instant::now();
        token.cancel();
        handle.await.unwrap();

        assert!(cancelled_at.elapsed() <= SHUTDOWN_GRACE);
    }
}
