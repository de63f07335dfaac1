use std::pin::pin;
use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::api::WatchParams;
use kube::Api;
use kube::Client;
use tracing::debug;
use tracing::warn;

use crate::domain::error::ClusterError;
use crate::domain::traits::ClusterReader;
use crate::domain::traits::EventStream;
use crate::domain::traits::PodSnapshot;
use crate::domain::types::PodObservation;
use crate::domain::types::SubscriptionScope;
use crate::infrastructure::k8s::observation::change_event;
use crate::infrastructure::k8s::observation::kube_error;
use crate::infrastructure::k8s::MAX_WATCH_TIMEOUT_SECS;
use crate::infrastructure::kube_client;
use crate::infrastructure::kube_client::CredentialSource;

/// Reads pods through the Kubernetes API.
///
/// Every [`connect`](ClusterReader::connect) builds a fresh client, so each watch
/// session owns its connection and picks up rotated credentials.
pub struct KubePodReader {
    credentials: Vec<CredentialSource>,
}

impl KubePodReader {
    pub fn new(credentials: Vec<CredentialSource>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl ClusterReader for KubePodReader {
    type Handle = Client;

    async fn connect(&self) -> Result<Client, Report<ClusterError>> {
        kube_client::init_kube_client(&self.credentials).await
    }

    async fn list(
        &self,
        client: &Client,
        scope: &SubscriptionScope,
    ) -> Result<PodSnapshot, Report<ClusterError>> {
        let list = pods_api(client, scope)
            .list(&list_params(scope))
            .await
            .map_err(|e| kube_error(e, "Failed to list pods"))?;

        let mut pods = Vec::with_capacity(list.items.len());
        for pod in list.items {
            match PodObservation::try_from(pod) {
                Ok(pod) => pods.push(pod),
                Err(e) => warn!("Skipping listed pod: {e:?}"),
            }
        }

        Ok(PodSnapshot {
            pods,
            resource_version: list.metadata.resource_version,
        })
    }

    async fn watch(
        &self,
        client: &Client,
        scope: &SubscriptionScope,
        from_version: Option<&str>,
        timeout: Duration,
    ) -> Result<EventStream, Report<ClusterError>> {
        let api = pods_api(client, scope);
        let params = watch_params(scope, timeout);
        let version = from_version.unwrap_or("0").to_string();
        debug!(%version, timeout_secs = ?params.timeout, "Opening pod watch");

        let events = async_stream::stream! {
            match api.watch(&params, &version).await {
                Err(e) => yield Err(kube_error(e, "Failed to start pod watch")),
                Ok(watch) => {
                    let mut watch = pin!(watch);
                    while let Some(item) = watch.next().await {
                        let converted = item
                            .map_err(|e| kube_error(e, "Pod watch stream failed"))
                            .and_then(change_event);
                        match converted {
                            Ok(Some(event)) => yield Ok(event),
                            Ok(None) => debug!("Ignoring watch bookmark"),
                            Err(e) => yield Err(e),
                        }
                    }
                }
            }
        };

        Ok(events.boxed())
    }
}

fn pods_api(client: &Client, scope: &SubscriptionScope) -> Api<Pod> {
    match scope {
        SubscriptionScope::Namespace(namespace) => Api::namespaced(client.clone(), namespace),
        SubscriptionScope::LabelSelector(_) | SubscriptionScope::ClusterWide => {
            Api::all(client.clone())
        }
    }
}

fn list_params(scope: &SubscriptionScope) -> ListParams {
    match scope {
        SubscriptionScope::LabelSelector(selector) => ListParams::default().labels(selector),
        _ => ListParams::default(),
    }
}

fn watch_params(scope: &SubscriptionScope, timeout: Duration) -> WatchParams {
    let timeout_secs = timeout.as_secs().clamp(1, MAX_WATCH_TIMEOUT_SECS) as u32;
    let params = WatchParams::default().timeout(timeout_secs);
    match scope {
        SubscriptionScope::LabelSelector(selector) => params.labels(selector),
        _ => params,
    }
}
