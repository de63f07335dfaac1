//! Maps observed pod changes to notifications.
//!
//! Classification is stateless: the same event always yields the same
//! notifications, so a pod stuck in a failing state re-notifies on every session.

use crate::domain::types::ChangeEvent;
use crate::domain::types::ChangeKind;
use crate::domain::types::ContainerObservation;
use crate::domain::types::Notification;
use crate::domain::types::PodObservation;

/// Container waiting reasons that indicate a pull or crash failure.
pub const ERROR_WAITING_REASONS: [&str; 3] =
    ["ImagePullBackOff", "ErrImagePull", "CrashLoopBackOff"];

/// Classify one change event into zero or more notifications.
///
/// Only `Added` and `Modified` events are considered. A failing pod phase and
/// failing containers are checked independently, so one event can produce a
/// pod-level notification plus one per failing container.
pub fn classify(event: &ChangeEvent) -> Vec<Notification> {
    if !matches!(event.kind, ChangeKind::Added | ChangeKind::Modified) {
        return Vec::new();
    }

    let pod = &event.subject;
    let mut notifications = Vec::new();

    if pod.phase.is_failure() {
        notifications.push(Notification {
            summary: format!("{} is in the {} phase", pod.identity, pod.phase),
            pod: pod.identity.clone(),
        });
    }

    notifications.extend(
        pod.containers
            .iter()
            .filter_map(|container| container_notification(container, pod)),
    );

    notifications
}

fn container_notification(
    container: &ContainerObservation,
    pod: &PodObservation,
) -> Option<Notification> {
    let reason = container
        .waiting_reason
        .as_deref()
        .filter(|reason| ERROR_WAITING_REASONS.contains(reason))?;

    Some(Notification {
        summary: format!(
            "container {} in {} is in the {reason} state",
            container.name, pod.identity
        ),
        pod: pod.identity.clone(),
    })
}
