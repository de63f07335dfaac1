//! Conversion from Kubernetes API objects into pod observations.

use error_stack::Report;
use k8s_openapi::api::core::v1::ContainerStatus;
use k8s_openapi::api::core::v1::Pod;
use kube::api::WatchEvent;

use crate::domain::error::ClusterError;
use crate::domain::types::ChangeEvent;
use crate::domain::types::ChangeKind;
use crate::domain::types::ContainerObservation;
use crate::domain::types::PodIdentity;
use crate::domain::types::PodObservation;
use crate::domain::types::PodPhase;

impl TryFrom<Pod> for PodObservation {
    type Error = Report<ClusterError>;

    fn try_from(pod: Pod) -> Result<Self, Self::Error> {
        let metadata = pod.metadata;
        let name = metadata.name.ok_or_else(|| {
            Report::new(ClusterError::MalformedEvent {
                message: "pod has no metadata.name".to_string(),
            })
        })?;
        let namespace = metadata.namespace.unwrap_or_else(|| "default".to_string());

        let status = pod.status.unwrap_or_default();
        // A pod the kubelet has not reported on yet has no phase.
        let phase = status
            .phase
            .as_deref()
            .map(PodPhase::from)
            .unwrap_or(PodPhase::Pending);
        let containers = status
            .container_statuses
            .unwrap_or_default()
            .into_iter()
            .map(container_observation)
            .collect();

        Ok(PodObservation {
            identity: PodIdentity {
                kind: <Pod as k8s_openapi::Resource>::KIND.to_string(),
                namespace,
                name,
            },
            phase,
            containers,
        })
    }
}

fn container_observation(status: ContainerStatus) -> ContainerObservation {
    ContainerObservation {
        name: status.name,
        waiting_reason: status
            .state
            .and_then(|state| state.waiting)
            .and_then(|waiting| waiting.reason),
    }
}

/// Convert a raw watch event. Bookmarks carry no pod and yield `None`.
///
/// # Errors
///
/// - [`ClusterError::MalformedEvent`] if the pod cannot be converted
/// - [`ClusterError::Auth`] or [`ClusterError::Stream`] for in-stream error objects
pub fn change_event(event: WatchEvent<Pod>) -> Result<Option<ChangeEvent>, Report<ClusterError>> {
    let (kind, pod) = match event {
        WatchEvent::Added(pod) => (ChangeKind::Added, pod),
        WatchEvent::Modified(pod) => (ChangeKind::Modified, pod),
        WatchEvent::Deleted(pod) => (ChangeKind::Deleted, pod),
        WatchEvent::Bookmark(_) => return Ok(None),
        WatchEvent::Error(response) => {
            let message = format!(
                "watch error {} {}: {}",
                response.code, response.reason, response.message
            );
            return Err(Report::new(if is_auth_status(response.code) {
                ClusterError::Auth { message }
            } else {
                ClusterError::Stream { message }
            }));
        }
    };

    Ok(Some(ChangeEvent {
        kind,
        subject: PodObservation::try_from(pod)?,
    }))
}

/// Map a client error onto the session error taxonomy.
pub fn kube_error(err: kube::Error, message: &str) -> Report<ClusterError> {
    let message = message.to_string();
    let context = match &err {
        kube::Error::Api(response) if is_auth_status(response.code) => {
            ClusterError::Auth { message }
        }
        kube::Error::Auth(_) => ClusterError::Auth { message },
        kube::Error::SerdeError(_) => ClusterError::MalformedEvent { message },
        _ => ClusterError::Stream { message },
    };
    Report::new(err).change_context(context)
}

fn is_auth_status(code: u16) -> bool {
    code == 401 || code == 403
}
