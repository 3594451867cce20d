//! `cyberday-cli` — the `run` entry point.
//!
//! Wires the in-memory adapters, runs one simulation, reconciles it, and
//! emits the summary, report, and analytics views as JSON. Exit code 0 on
//! any completed run (recorded warnings included); non-zero only when an
//! adapter cannot be reached before the first simulation tick.

pub mod config;
pub mod run;

pub use config::CliConfig;
pub use run::{RunOutput, execute};
