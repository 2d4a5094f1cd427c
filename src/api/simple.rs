use std::sync::Once;
use tracing::info;
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Install the global fmt subscriber. Later calls are no-ops.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        info!("puzzle engine tracing initialized");
    });
}
