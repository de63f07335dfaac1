use anyhow::Result;

use crate::app::tasks::Scheduler;
use crate::infrastructure::k8s::KubePodReader;
use crate::infrastructure::webhook::WebhookSink;

/// Application core structure
pub struct Application {
    scheduler: Scheduler<KubePodReader, WebhookSink>,
}

impl Application {
    pub fn new(scheduler: Scheduler<KubePodReader, WebhookSink>) -> Self {
        Self { scheduler }
    }

    /// Run watch sessions until SIGTERM or SIGINT.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!("Starting pod watch scheduler...");

        let token = self.scheduler.cancellation_token();
        let signal_handler = {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate())?;
                let mut sigint = signal(SignalKind::interrupt())?;

                tokio::spawn(async move {
                    tokio::select! {
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, initiating graceful shutdown");
                        }
                        _ = sigint.recv() => {
                            tracing::info!("Received SIGINT, initiating graceful shutdown");
                        }
                    }
                    token.cancel();
                })
            }
            #[cfg(not(unix))]
            {
                tokio::spawn(async move {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl+C: {e}");
                        return;
                    }
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    token.cancel();
                })
            }
        };

        self.scheduler.run().await;
        signal_handler.abort();

        tracing::info!("Application shutdown completed");
        Ok(())
    }
}
