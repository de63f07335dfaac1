//! provides logging helpers

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;

/// Build the filter: `RUST_LOG` directives on top of `default_level`.
pub fn env_filter(default_level: LevelFilter) -> filter::EnvFilter {
    filter::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// initiate the global tracing subscriber, writing to stdout
///
/// The returned guard flushes buffered log lines when dropped; keep it alive
/// for the lifetime of the process.
pub fn init(default_level: LevelFilter) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let fmt_layer = layer()
        .with_writer(writer)
        .with_target(true)
        .with_filter(env_filter(default_level));

    registry().with(fmt_layer).init();
    guard
}
