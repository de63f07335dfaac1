//! Adapters for the Kubernetes API and the webhook sink.

pub mod k8s;
pub mod kube_client;
pub mod webhook;
