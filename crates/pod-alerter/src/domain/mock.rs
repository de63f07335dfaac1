//! In-memory cluster reader and notification sink for exercising the watch loop.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;
use futures::stream;
use futures::StreamExt;

use crate::domain::error::ClusterError;
use crate::domain::error::SinkError;
use crate::domain::traits::ClusterReader;
use crate::domain::traits::EventStream;
use crate::domain::traits::NotificationSink;
use crate::domain::traits::PodSnapshot;
use crate::domain::types::ChangeEvent;
use crate::domain::types::ContainerObservation;
use crate::domain::types::Notification;
use crate::domain::types::PodIdentity;
use crate::domain::types::PodObservation;
use crate::domain::types::PodPhase;
use crate::domain::types::SubscriptionScope;

/// What the fake watch stream yields, in order.
pub(crate) enum Step {
    Event(ChangeEvent),
    Malformed,
    Broken,
    AuthExpired,
}

#[derive(Default)]
pub(crate) struct FakeReader {
    pub(crate) refuse_connect: bool,
    pub(crate) snapshot: Vec<PodObservation>,
    pub(crate) resource_version: Option<String>,
    pub(crate) steps: Mutex<Vec<Step>>,
    /// Keep the stream open after the scripted steps instead of ending it.
    pub(crate) hang: bool,
    /// End the stream only once the requested watch timeout has elapsed.
    pub(crate) close_at_timeout: bool,
    pub(crate) watched: Mutex<Vec<(SubscriptionScope, Option<String>, Duration)>>,
    pub(crate) connects: AtomicUsize,
}

impl FakeReader {
    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterReader for FakeReader {
    type Handle = ();

    async fn connect(&self) -> Result<(), Report<ClusterError>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connect {
            return Err(Report::new(ClusterError::Auth {
                message: "no credentials".to_string(),
            }));
        }
        Ok(())
    }

    async fn list(
        &self,
        _handle: &(),
        _scope: &SubscriptionScope,
    ) -> Result<PodSnapshot, Report<ClusterError>> {
        Ok(PodSnapshot {
            pods: self.snapshot.clone(),
            resource_version: self.resource_version.clone(),
        })
    }

    async fn watch(
        &self,
        _handle: &(),
        scope: &SubscriptionScope,
        from_version: Option<&str>,
        timeout: Duration,
    ) -> Result<EventStream, Report<ClusterError>> {
        self.watched.lock().unwrap().push((
            scope.clone(),
            from_version.map(str::to_string),
            timeout,
        ));

        let items: Vec<_> = std::mem::take(&mut *self.steps.lock().unwrap())
            .into_iter()
            .map(|step| match step {
                Step::Event(event) => Ok(event),
                Step::Malformed => Err(Report::new(ClusterError::MalformedEvent {
                    message: "bad json".to_string(),
                })),
                Step::Broken => Err(Report::new(ClusterError::Stream {
                    message: "connection reset".to_string(),
                })),
                Step::AuthExpired => Err(Report::new(ClusterError::Auth {
                    message: "token expired".to_string(),
                })),
            })
            .collect();

        let scripted = stream::iter(items);
        if self.hang {
            Ok(scripted.chain(stream::pending()).boxed())
        } else if self.close_at_timeout {
            let closed = stream::once(tokio::time::sleep(timeout))
                .filter_map(|()| async { None });
            Ok(scripted.chain(closed).boxed())
        } else {
            Ok(scripted.boxed())
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) failing_calls: Mutex<usize>,
    pub(crate) attempts: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub(crate) fn failing_first(n: usize) -> Self {
        Self {
            failing_calls: Mutex::new(n),
            ..Default::default()
        }
    }

    pub(crate) fn summaries(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.summary.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, notification: &Notification) -> Result<(), Report<SinkError>> {
        self.attempts.lock().unwrap().push(notification.clone());
        let mut failing = self.failing_calls.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            return Err(Report::new(SinkError::Delivery {
                message: "HTTP 500".to_string(),
            }));
        }
        Ok(())
    }
}

pub(crate) fn pod(
    name: &str,
    phase: PodPhase,
    containers: &[(&str, Option<&str>)],
) -> PodObservation {
    PodObservation {
        identity: PodIdentity {
            kind: "Pod".to_string(),
            namespace: "prod".to_string(),
            name: name.to_string(),
        },
        phase,
        containers: containers
            .iter()
            .map(|(name, reason)| ContainerObservation {
                name: name.to_string(),
                waiting_reason: reason.map(str::to_string),
            })
            .collect(),
    }
}
