use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cyberday_core::{ProductId, Tick};
use cyberday_reconcile::IntegrationReport;

/// Product-level ranking metric.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenue,
    Purchases,
    UnitsSold,
}

/// One row of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopEntry {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub value: u64,
}

/// Best-performing products by the chosen metric.
///
/// Ties break on product id, so rankings are stable across runs.
pub fn top_n(report: &IntegrationReport, metric: Metric, n: usize) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = report
        .by_product
        .iter()
        .map(|(id, stats)| TopEntry {
            product_id: id.clone(),
            name: stats.name.clone(),
            category: stats.category.clone(),
            value: match metric {
                Metric::Revenue => stats.revenue,
                Metric::Purchases => stats.purchases,
                Metric::UnitsSold => stats.units_sold,
            },
        })
        .collect();

    entries.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    entries.truncate(n);
    entries
}

/// Revenue share per category, as fractions of total revenue.
///
/// All zeros when the report carries no revenue.
pub fn category_distribution(report: &IntegrationReport) -> BTreeMap<String, f64> {
    let total = report.total_revenue;
    report
        .by_category
        .iter()
        .map(|(category, stats)| {
            let share = if total == 0 {
                0.0
            } else {
                stats.revenue as f64 / total as f64
            };
            (category.clone(), share)
        })
        .collect()
}

/// Abandonment rate per category (`abandonments / max(sessions, 1)`).
pub fn abandonment_by_category(report: &IntegrationReport) -> BTreeMap<String, f64> {
    report
        .by_category
        .iter()
        .map(|(category, stats)| {
            let rate = stats.abandonments as f64 / stats.sessions.max(1) as f64;
            (category.clone(), rate)
        })
        .collect()
}

/// Fixed-width bucketing over virtual time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickBucketing {
    pub width: u64,
}

impl TickBucketing {
    pub fn ticks(width: u64) -> Self {
        Self { width: width.max(1) }
    }

    fn bucket_start(&self, tick: Tick) -> Tick {
        let width = self.width.max(1);
        Tick((tick.value() / width) * width)
    }
}

/// One point of a revenue trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub bucket_start: Tick,
    pub revenue: u64,
}

/// Revenue over virtual time, bucketed into fixed-width tick windows.
///
/// Buckets with zero revenue are omitted; points come out in ascending
/// bucket order.
pub fn revenue_trend(report: &IntegrationReport, bucketing: TickBucketing) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<Tick, u64> = BTreeMap::new();
    for (tick, revenue) in &report.revenue_by_tick {
        *buckets.entry(bucketing.bucket_start(*tick)).or_default() += revenue;
    }
    buckets
        .into_iter()
        .map(|(bucket_start, revenue)| TrendPoint {
            bucket_start,
            revenue,
        })
        .collect()
}
