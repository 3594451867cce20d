//! Integration tests for the full pipeline.
//!
//! Tests: Simulation → EventStore → Reconciliation → IntegrationReport
//!
//! Verifies:
//! - Simulated traffic reconciles into consistent aggregates
//! - Store-managed expiry shrinks later reports instead of breaking them
//! - Catalog churn between the two runs surfaces as orphans, not losses

#[cfg(test)]
mod tests {
    use cyberday_catalog::{InMemoryCatalogStore, Product};
    use cyberday_core::{CancelToken, ProductId, Tick, Ttl};
    use cyberday_events::{EventStore, InMemoryEventStore};
    use cyberday_simulation::{ArrivalProfile, SimulationConfig, SimulationEngine};

    use crate::engine::ReconciliationEngine;

    fn product(id: &str, category: &str, price: u64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: category.to_string(),
            unit_price: price,
            rating: 4.1,
            stock,
        }
    }

    fn demo_catalog() -> InMemoryCatalogStore {
        InMemoryCatalogStore::with_products(vec![
            product("P1", "Electronics", 1_000, 10_000),
            product("P2", "Electronics", 2_500, 10_000),
            product("P3", "Books", 800, 10_000),
            product("P4", "Garden", 4_600, 10_000),
        ])
    }

    fn config(seed: u64) -> SimulationConfig {
        SimulationConfig::default()
            .with_seed(seed)
            .with_duration(100)
            .with_arrival(ArrivalProfile::Spike {
                base: 1.0,
                peak: 6.0,
                start: 40,
                end: 60,
            })
    }

    #[test]
    fn simulated_run_reconciles_into_consistent_aggregates() {
        let catalog = demo_catalog();
        let store = InMemoryEventStore::new();
        let sim = SimulationEngine::new(&catalog, &store);
        let summary = sim.run(&config(1234), &CancelToken::new()).unwrap();
        assert!(summary.purchased > 0);

        let engine = ReconciliationEngine::new(&catalog, &store);
        let report = engine.reconcile(Tick(100)).unwrap();

        // Nothing expired and the catalog is unchanged, so both engines
        // agree on what happened.
        assert_eq!(report.total_sessions, summary.sessions_started);
        assert_eq!(report.total_purchases, summary.purchased);
        assert_eq!(report.total_abandonments, summary.abandoned);
        assert_eq!(report.total_revenue, summary.revenue);
        assert_eq!(report.category_revenue_sum(), report.total_revenue);
        assert!(report.orphans.is_empty());
    }

    #[test]
    fn expiry_between_reconciliations_shrinks_the_report() {
        let catalog = demo_catalog();
        let store = InMemoryEventStore::new();
        let sim = SimulationEngine::new(&catalog, &store);

        let mut cfg = config(99);
        cfg.cart_ttl = Ttl::ticks(30);
        cfg.session_ttl = Ttl::ticks(30);
        sim.run(&cfg, &CancelToken::new()).unwrap();

        let engine = ReconciliationEngine::new(&catalog, &store);
        let fresh = engine.reconcile(Tick(100)).unwrap();
        let stale = engine.reconcile(Tick(500)).unwrap();

        // Expired data is simply absent; never a crash.
        assert!(stale.total_sessions < fresh.total_sessions || fresh.total_sessions == 0);
        assert_eq!(stale.total_sessions, 0);
        assert_eq!(stale.total_revenue, 0);
    }

    #[test]
    fn catalog_churn_between_runs_surfaces_as_orphans() {
        let catalog = demo_catalog();
        let store = InMemoryEventStore::new();
        let sim = SimulationEngine::new(&catalog, &store);
        let summary = sim.run(&config(7), &CancelToken::new()).unwrap();
        assert!(summary.purchased > 0);

        // The upstream stage retires every Electronics product before the
        // reconciliation run.
        catalog.remove(&ProductId::new("P1")).unwrap();
        catalog.remove(&ProductId::new("P2")).unwrap();

        let engine = ReconciliationEngine::new(&catalog, &store);
        let report = engine.reconcile(Tick(100)).unwrap();

        assert!(!report.orphans.is_empty());
        assert!(report.data_quality_warnings > 0);
        for orphan in &report.orphans {
            assert!(matches!(orphan.product_id.as_str(), "P1" | "P2"));
        }
        // Orphans carry no revenue.
        assert!(report.total_revenue < summary.revenue);
        assert_eq!(report.category_revenue_sum(), report.total_revenue);
    }

    #[test]
    fn cancelled_run_still_reconciles_cleanly() {
        let catalog = demo_catalog();
        let store = InMemoryEventStore::new();
        let sim = SimulationEngine::new(&catalog, &store);

        // Cancel immediately: zero ticks, zero sessions, valid state.
        let cancel = CancelToken::new();
        cancel.cancel();
        let summary = sim.run(&config(3), &cancel).unwrap();
        assert!(summary.cancelled);

        let engine = ReconciliationEngine::new(&catalog, &store);
        let report = engine.reconcile(Tick(100)).unwrap();
        assert_eq!(report.total_sessions, 0);
        assert_eq!(report.total_revenue, 0);
    }

    #[test]
    fn reconciliation_does_not_disturb_the_event_store() {
        let catalog = demo_catalog();
        let store = InMemoryEventStore::new();
        let sim = SimulationEngine::new(&catalog, &store);
        sim.run(&config(55), &CancelToken::new()).unwrap();

        let before = store.get_all_active(Tick(100)).unwrap();
        let engine = ReconciliationEngine::new(&catalog, &store);
        engine.reconcile(Tick(100)).unwrap();
        let after = store.get_all_active(Tick(100)).unwrap();
        assert_eq!(before, after);
    }
}
