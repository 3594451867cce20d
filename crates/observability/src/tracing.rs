//! Subscriber setup for the engine crates.

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber: JSON lines, level filter from
/// `RUST_LOG` (default `info`).
///
/// Engine runs log structured fields (seed, tick counts, revenue and
/// warning totals), so the JSON formatter keeps them machine-readable
/// next to the report on stdout. A second install attempt is silently
/// ignored, which lets tests call through the same entry point.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
