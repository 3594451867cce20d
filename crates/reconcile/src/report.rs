use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cyberday_core::{ProductId, Tick};
use cyberday_events::CartEvent;

/// Per-category aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub sessions: u64,
    pub purchases: u64,
    pub abandonments: u64,
    /// Σ unit_price × quantity over resolved purchase events, in smallest
    /// currency unit.
    pub revenue: u64,
    /// purchases / max(sessions, 1).
    pub conversion_rate: f64,
}

/// Per-product aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub name: String,
    pub category: String,
    pub purchases: u64,
    pub units_sold: u64,
    pub revenue: u64,
}

/// Immutable result of one reconciliation run.
///
/// Recomputed from scratch on every `reconcile` call, never mutated in
/// place. All collections are ordered (`BTreeMap`, sorted orphans) and no
/// field depends on the wall clock, so the same `as_of` against unchanged
/// stores serializes to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationReport {
    pub as_of: Tick,
    pub total_sessions: u64,
    pub total_purchases: u64,
    pub total_abandonments: u64,
    pub total_revenue: u64,
    pub by_category: BTreeMap<String, CategoryStats>,
    pub by_product: BTreeMap<ProductId, ProductStats>,
    /// Events whose product reference did not resolve against the catalog
    /// snapshot, sorted by event id. Excluded from revenue and conversion.
    pub orphans: Vec<CartEvent>,
    /// Count of recoverable data conditions observed while joining
    /// (orphan references, non-positive quantities, unresolvable groups).
    pub data_quality_warnings: u64,
    /// Resolved purchase revenue per virtual tick (feeds trend views).
    pub revenue_by_tick: BTreeMap<Tick, u64>,
}

impl IntegrationReport {
    /// Overall conversion rate.
    pub fn conversion_rate(&self) -> f64 {
        self.total_purchases as f64 / self.total_sessions.max(1) as f64
    }

    /// Aggregation consistency: per-category revenue must sum to the total.
    pub fn category_revenue_sum(&self) -> u64 {
        self.by_category.values().map(|c| c.revenue).sum()
    }
}
