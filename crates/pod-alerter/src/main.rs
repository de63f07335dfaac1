use anyhow::Result;
use clap::Parser;
use pod_alerter::app::ApplicationBuilder;
use pod_alerter::config::Cli;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();
    let _guard = utils::logging::init(cli.log_level);

    tracing::info!("Starting pod-alerter {}", env!("CARGO_PKG_VERSION"));

    let app = ApplicationBuilder::new(cli).build()?;
    app.run().await
}
