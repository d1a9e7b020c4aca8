//! Diagnostic tracing for camlrun.
//!
//! Tracing output goes to stderr and is separate from the user-facing result,
//! which is the only thing written to stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset. The `--debug` flag does not
/// change verbosity: it only controls the failure detail printed on stdout.
///
/// # Example
/// ```bash
/// RUST_LOG=camlrun=trace camlrun program.ml
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
