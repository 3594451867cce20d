//! `cyberday-simulation` — the seeded traffic generator.
//!
//! Drives a virtual clock over discrete ticks, spawns shopping sessions
//! from configurable arrival/abandonment profiles, and writes every state
//! change through the event store adapter. Holds no durable state of its
//! own beyond the clock and RNG, so a run is fully replayable from its
//! seed.

pub mod config;
pub mod engine;
pub mod summary;

pub use config::{AbandonmentProfile, ArrivalProfile, SimulationConfig};
pub use engine::{SimulationEngine, SimulationError};
pub use summary::SimulationSummary;
