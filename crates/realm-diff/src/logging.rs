//! Logging initialization.
//!
//! Events always go to standard error so that standard output carries nothing
//! but the JSON result.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

/// Filter directive for a `-v` count: 0 → warn, 1 → info, 2 → debug, more → trace.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber. Later calls are no-ops.
pub fn init(verbosity: u8) {
    INIT_ONCE.call_once(|| {
        let installed = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_env_filter(EnvFilter::new(level_for(verbosity)))
            .try_init();
        if installed.is_err() {
            // Another subscriber (e.g. a test harness) is already global.
            tracing::trace!("subscriber already installed");
        }
    });
}
