use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "WORKBENCH_LOG";

/// Console logging filtered by `WORKBENCH_LOG`, e.g.
/// `WORKBENCH_LOG=maestro_workbench=debug`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("maestro_workbench=info"));

    // A second init (tests, hot reload) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
