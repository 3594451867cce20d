//! The `run` pipeline: simulate, reconcile, derive views.

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use cyberday_analytics::{Metric, TickBucketing, TopEntry, TrendPoint};
use cyberday_catalog::{InMemoryCatalogStore, Product};
use cyberday_core::{CancelToken, Tick};
use cyberday_events::InMemoryEventStore;
use cyberday_reconcile::{IntegrationReport, ReconciliationEngine};
use cyberday_simulation::{SimulationEngine, SimulationSummary};

use crate::config::CliConfig;

/// Everything one run produces, ready for JSON output.
///
/// `generated_at` is the only wall-clock field; the summary and report
/// underneath stay deterministic in `(seed, config)`.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub generated_at: DateTime<Utc>,
    pub summary: SimulationSummary,
    pub report: IntegrationReport,
    pub top_products: Vec<TopEntry>,
    pub category_distribution: std::collections::BTreeMap<String, f64>,
    pub revenue_trend: Vec<TrendPoint>,
}

/// Execute the full pipeline against in-memory stores.
///
/// Fails only before the first simulation tick (catalog unreadable, adapter
/// unreachable); recorded warnings ride inside the successful output.
pub fn execute(config: &CliConfig, cancel: &CancelToken) -> Result<RunOutput> {
    let products = load_catalog(&config.catalog_path)?;
    info!(
        products = products.len(),
        path = %config.catalog_path,
        "catalog fixture loaded"
    );

    let catalog = InMemoryCatalogStore::with_products(products);
    let store = InMemoryEventStore::new();

    let simulation = SimulationEngine::new(&catalog, &store);
    let summary = simulation
        .run(&config.simulation, cancel)
        .context("simulation failed before the first tick")?;

    let reconciler = ReconciliationEngine::new(&catalog, &store);
    let report = reconciler
        .reconcile(Tick(config.simulation.duration_ticks))
        .context("reconciliation failed")?;

    let top_products = cyberday_analytics::top_n(&report, Metric::Revenue, 10);
    let category_distribution = cyberday_analytics::category_distribution(&report);
    let bucket = (config.simulation.duration_ticks / 20).max(1);
    let revenue_trend = cyberday_analytics::revenue_trend(&report, TickBucketing::ticks(bucket));

    Ok(RunOutput {
        generated_at: Utc::now(),
        summary,
        report,
        top_products,
        category_distribution,
        revenue_trend,
    })
}

fn load_catalog(path: &str) -> Result<Vec<Product>> {
    let file = File::open(path).with_context(|| format!("cannot open catalog fixture {path:?}"))?;
    let products: Vec<Product> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("malformed catalog fixture {path:?}"))?;
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use cyberday_core::ProductId;

    fn fixture(products: &[Product]) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "cyberday-catalog-{}-{}.json",
            std::process::id(),
            products.len()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(serde_json::to_string(products).unwrap().as_bytes())
            .unwrap();
        path
    }

    fn demo_products() -> Vec<Product> {
        vec![
            Product {
                id: ProductId::new("P1"),
                name: "Widget".to_string(),
                category: "Electronics".to_string(),
                unit_price: 1_000,
                rating: 4.4,
                stock: 10_000,
            },
            Product {
                id: ProductId::new("P2"),
                name: "Novel".to_string(),
                category: "Books".to_string(),
                unit_price: 900,
                rating: 4.8,
                stock: 10_000,
            },
        ]
    }

    #[test]
    fn pipeline_runs_end_to_end() {
        let path = fixture(&demo_products());
        let config = CliConfig::from_lookup(|key| match key {
            "CYBERDAY_CATALOG" => Some(path.to_string_lossy().into_owned()),
            "CYBERDAY_DURATION" => Some("50".to_string()),
            _ => None,
        })
        .unwrap();

        let output = execute(&config, &CancelToken::new()).unwrap();
        assert!(output.summary.sessions_started > 0);
        assert_eq!(
            output.report.category_revenue_sum(),
            output.report.total_revenue
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_catalog_is_a_hard_failure() {
        let config = CliConfig::from_lookup(|key| match key {
            "CYBERDAY_CATALOG" => Some("/nonexistent/catalog.json".to_string()),
            _ => None,
        })
        .unwrap();

        assert!(execute(&config, &CancelToken::new()).is_err());
    }
}
