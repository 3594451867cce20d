//! `cyberday-analytics` — pure derived views over an [`IntegrationReport`].
//!
//! No I/O, no mutation: every function here is deterministic in its input
//! and leaves the report untouched. Chart rendering lives downstream; this
//! crate only shapes aggregates.
//!
//! [`IntegrationReport`]: cyberday_reconcile::IntegrationReport

pub mod views;

pub use views::{
    Metric, TickBucketing, TopEntry, TrendPoint, abandonment_by_category, category_distribution,
    revenue_trend, top_n,
};
