pub mod paths;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("steward_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Two-decimal presentation rounding. Totals keep full precision
/// internally; round only at the rendering boundary.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
