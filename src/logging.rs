// src/logging.rs
// =============================================================================
// Log setup.
//
// All diagnostics go through `tracing` and are printed to stderr, so the
// --json output on stdout stays machine readable.
//
// RUST_LOG decides the filter when it is set. Otherwise -v flags pick it:
//   (none) -> info,   -v -> debug,   -vv -> trace
// =============================================================================

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    // try_init so a second call (e.g. from tests) is a no-op instead of a panic
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info,crab=info",
        1 => "info,crab=debug",
        _ => "debug,crab=trace",
    }
}
