//! Seams between the watch loop and the outside world.

use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;
use futures::stream::BoxStream;

use crate::domain::error::ClusterError;
use crate::domain::error::SinkError;
use crate::domain::types::ChangeEvent;
use crate::domain::types::Notification;
use crate::domain::types::PodObservation;
use crate::domain::types::SubscriptionScope;

/// Stream of change events for one watch session.
///
/// The stream ending is the deliberate session timeout. An `Err` item with a
/// [`ClusterError::Stream`] or [`ClusterError::Auth`] context ends the session
/// abnormally, while [`ClusterError::MalformedEvent`] items are logged and skipped.
pub type EventStream = BoxStream<'static, Result<ChangeEvent, Report<ClusterError>>>;

/// Current pods for a scope plus the version to resume watching from.
#[derive(Debug, Clone, Default)]
pub struct PodSnapshot {
    pub pods: Vec<PodObservation>,
    pub resource_version: Option<String>,
}

/// Read-only access to pod state in the cluster.
#[async_trait]
pub trait ClusterReader: Send + Sync {
    /// Connection handle owned by a single session.
    type Handle: Send + Sync;

    /// Establish an authenticated session.
    async fn connect(&self) -> Result<Self::Handle, Report<ClusterError>>;

    /// List the pods currently matching `scope`.
    async fn list(
        &self,
        handle: &Self::Handle,
        scope: &SubscriptionScope,
    ) -> Result<PodSnapshot, Report<ClusterError>>;

    /// Stream changes after `from_version`, ending on its own after `timeout`.
    async fn watch(
        &self,
        handle: &Self::Handle,
        scope: &SubscriptionScope,
        from_version: Option<&str>,
        timeout: Duration,
    ) -> Result<EventStream, Report<ClusterError>>;
}

/// Best-effort delivery of a single notification.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), Report<SinkError>>;
}
