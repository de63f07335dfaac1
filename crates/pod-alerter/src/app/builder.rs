use std::sync::Arc;

use anyhow::Result;

use crate::app::core::Application;
use crate::app::tasks::Scheduler;
use crate::config::Cli;
use crate::domain::session::WatchLoop;
use crate::infrastructure::k8s::KubePodReader;
use crate::infrastructure::kube_client::CredentialSource;
use crate::infrastructure::webhook::WebhookSink;

/// Application builder
pub struct ApplicationBuilder {
    cli: Cli,
}

impl ApplicationBuilder {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the reader, sink and scheduler from configuration.
    pub fn build(self) -> Result<Application> {
        tracing::info!("Building application components...");

        let credentials = CredentialSource::default_chain(
            self.cli.kubeconfig.clone(),
            self.cli.cluster_name.clone(),
        );
        let reader = KubePodReader::new(credentials);

        let sink = WebhookSink::new(self.cli.webhook_url.clone(), self.cli.webhook_timeout())
            .map_err(|e| anyhow::anyhow!("Failed to initialize webhook sink: {e:?}"))?;

        let watch_loop = WatchLoop::new(
            Arc::new(reader),
            Arc::new(sink),
            self.cli.scope_config(),
            self.cli.session_timeout(),
        );

        let scheduler = Scheduler::new(watch_loop, self.cli.interval());
        Ok(Application::new(scheduler))
    }
}
