use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::scope::ScopeConfig;
use crate::infrastructure::k8s::MAX_WATCH_TIMEOUT_SECS;

/// Watches pods and posts a webhook notification when a pod or container fails.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        env = "WEBHOOK_URL",
        help = "Webhook URL notifications are posted to"
    )]
    pub webhook_url: Url,

    #[arg(
        long,
        env = "NAMESPACE",
        help = "Namespace to watch (takes precedence over --label)"
    )]
    pub namespace: Option<String>,

    #[arg(
        long,
        env = "LABEL",
        help = "Label selector for pods to watch across all namespaces, e.g. app=web"
    )]
    pub label: Option<String>,

    #[arg(
        long,
        env = "CLUSTER_NAME",
        help = "Kubeconfig context to use when not running inside a cluster"
    )]
    pub cluster_name: Option<String>,

    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to in-cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        env = "INTERVAL",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between watch sessions"
    )]
    pub interval: u64,

    #[arg(
        long,
        env = "SESSION_TIMEOUT",
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..=MAX_WATCH_TIMEOUT_SECS),
        help = "Seconds a single watch session stays open"
    )]
    pub session_timeout: u64,

    #[arg(
        long,
        env = "WEBHOOK_TIMEOUT",
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds to wait for the webhook to respond"
    )]
    pub webhook_timeout: u64,

    #[arg(
        long,
        env = "LOG_LEVEL",
        default_value = "info",
        help = "Default log level (RUST_LOG overrides it)"
    )]
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout)
    }

    pub fn scope_config(&self) -> ScopeConfig {
        ScopeConfig {
            namespace: self.namespace.clone(),
            label_selector: self.label.clone(),
        }
    }
}
