//! Logging setup for the engine.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set, otherwise defaults to `info` for engine
/// crates and `warn` for everything else.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,gable=info,gable_assets=info,gable_core=info")),
        )
        .init();
    tracing::debug!("logging initialized");
}
