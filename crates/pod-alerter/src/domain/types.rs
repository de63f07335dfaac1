//! Value types flowing between the cluster reader, the classifier and the sink.

use std::fmt;

/// Lifecycle phase reported in a pod's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Phases that warrant a pod-level notification.
    pub fn is_failure(self) -> bool {
        matches!(self, PodPhase::Failed | PodPhase::Unknown)
    }
}

impl From<&str> for PodPhase {
    /// Unrecognised phase strings map to [`PodPhase::Unknown`].
    fn from(phase: &str) -> Self {
        match phase {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Identity of an observed pod.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodIdentity {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for PodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// Snapshot of one container inside a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerObservation {
    pub name: String,
    /// Only present while the container is waiting.
    pub waiting_reason: Option<String>,
}

/// Snapshot of one pod at one moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodObservation {
    pub identity: PodIdentity,
    pub phase: PodPhase,
    pub containers: Vec<ContainerObservation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Other,
}

/// A single change delivered by a [`ClusterReader`](crate::domain::traits::ClusterReader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub subject: PodObservation,
}

/// An alert destined for the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub summary: String,
    pub pod: PodIdentity,
}

/// Which pods a watch session subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SubscriptionScope {
    #[display("namespace {_0}")]
    Namespace(String),
    #[display("label selector {_0}")]
    LabelSelector(String),
    #[display("all namespaces")]
    ClusterWide,
}
