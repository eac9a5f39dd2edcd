use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize tracing to stderr.
///
/// `RUST_LOG` wins over `default_level` (the `logging.level` setting), so
/// stdout stays reserved for command output.
pub fn init(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .compact();

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();

    tracing::debug!("tracing initialized");
}
