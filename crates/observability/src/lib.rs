//! `cyberday-observability` — structured logging for the engine crates.
//!
//! One call from the binary (or a test harness) wires every engine's
//! `tracing` output; nothing else in the workspace touches subscriber
//! state.

/// Install the process-wide subscriber. Idempotent.
pub fn init() {
    self::tracing::init();
}

pub mod tracing;
