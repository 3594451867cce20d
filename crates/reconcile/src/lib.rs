//! `cyberday-reconcile` — the snapshot reconciliation engine.
//!
//! Joins one catalog snapshot with one event-store snapshot into an
//! [`IntegrationReport`]. The two stores are independent and expire records
//! on their own schedule, so the join treats every cross-store reference as
//! optional and surfaces unresolvable data instead of dropping it silently.

pub mod engine;
pub mod report;

mod integration_tests;

pub use engine::{ReconcileError, ReconciliationEngine};
pub use report::{CategoryStats, IntegrationReport, ProductStats};
