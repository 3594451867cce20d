//! The reconciliation engine: one snapshot per store, then a pure join.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::{debug, info};

use cyberday_catalog::{CatalogStore, Product};
use cyberday_core::{ProductId, SessionId, StoreError, Tick};
use cyberday_events::{CartEvent, EventKind, EventStore, Session, SessionOutcome};

use crate::report::{CategoryStats, IntegrationReport, ProductStats};

/// Fatal reconciliation failure.
///
/// Reconciliation cannot partially complete: any store error fails the
/// whole call. Recoverable data conditions never land here — they are
/// counted inside the report.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("store read failed: {0}")]
    Store(#[from] StoreError),
}

/// Joins a catalog snapshot with an event-store snapshot into an
/// [`IntegrationReport`].
///
/// ## Snapshot isolation
///
/// `reconcile` performs exactly one read per store and never re-reads
/// mid-computation. That single-read contract is what makes it safe to run
/// concurrently with writers and with store-managed expiry: the engine
/// never depends on either store remaining unchanged after its read.
pub struct ReconciliationEngine<C, E> {
    catalog: C,
    events: E,
}

impl<C, E> ReconciliationEngine<C, E>
where
    C: CatalogStore,
    E: EventStore,
{
    pub fn new(catalog: C, events: E) -> Self {
        Self { catalog, events }
    }

    /// Build the integration report as of one point in virtual time.
    pub fn reconcile(&self, as_of: Tick) -> Result<IntegrationReport, ReconcileError> {
        // The only two store round trips in the whole computation.
        let catalog: HashMap<ProductId, Product> = self
            .catalog
            .snapshot()?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let active = self.events.get_all_active(as_of)?;

        debug!(
            as_of = as_of.value(),
            products = catalog.len(),
            sessions = active.sessions.len(),
            events = active.events.len(),
            "reconciling snapshots"
        );

        let mut report = IntegrationReport {
            as_of,
            ..IntegrationReport::default()
        };

        // Deterministic processing order regardless of store internals.
        let mut events = active.events;
        events.sort_by(|a, b| {
            (a.at, a.session_id, a.sequence).cmp(&(b.at, b.session_id, b.sequence))
        });
        let mut sessions = active.sessions;
        sessions.sort_by(|a, b| (a.started_at, a.id).cmp(&(b.started_at, b.id)));

        let mut groups: BTreeMap<SessionId, GroupFacts> = BTreeMap::new();

        // Pass one: event-level aggregation (revenue, orphans, quality).
        for event in &events {
            let facts = groups.entry(event.session_id).or_default();

            if event.quantity <= 0 {
                // Never negative revenue; surfaced, not silently dropped.
                report.data_quality_warnings += 1;
                continue;
            }

            let Some(product) = catalog.get(&event.product_id) else {
                report.data_quality_warnings += 1;
                report.orphans.push(event.clone());
                continue;
            };

            facts.resolved_category.get_or_insert_with(|| product.category.clone());

            if event.kind == EventKind::Purchase {
                facts.resolved_purchase = true;
                let amount = product.revenue_for(event.quantity.unsigned_abs());
                report.total_revenue += amount;
                *report.revenue_by_tick.entry(event.at).or_default() += amount;

                let category = report
                    .by_category
                    .entry(product.category.clone())
                    .or_default();
                category.revenue += amount;

                let stats = report
                    .by_product
                    .entry(product.id.clone())
                    .or_insert_with(|| ProductStats {
                        name: product.name.clone(),
                        category: product.category.clone(),
                        purchases: 0,
                        units_sold: 0,
                        revenue: 0,
                    });
                stats.purchases += 1;
                stats.units_sold += event.quantity.unsigned_abs();
                stats.revenue += amount;
            }
        }

        // Pass two: session bucketing under each session's category.
        for session in &sessions {
            let facts = groups.remove(&session.id).unwrap_or_default();
            let bucket = bucket_for(session, &facts);
            report.count_session(&session.affinity, bucket);
        }

        // Remaining groups reference sessions whose record has expired.
        // Eventual consistency, not an error: attribute them to the first
        // resolvable product's category.
        for (session_id, facts) in groups {
            let Some(category) = facts.resolved_category.clone() else {
                // Nothing in this group resolves; its events are already in
                // the orphan list.
                report.data_quality_warnings += 1;
                debug!(session = %session_id, "fully unresolvable dangling group");
                continue;
            };
            let bucket = if facts.resolved_purchase {
                SessionBucket::Purchased
            } else {
                SessionBucket::Open
            };
            report.count_session(&category, bucket);
        }

        for stats in report.by_category.values_mut() {
            stats.conversion_rate = stats.purchases as f64 / stats.sessions.max(1) as f64;
        }
        report.orphans.sort_by_key(|e| e.id);

        info!(
            as_of = as_of.value(),
            sessions = report.total_sessions,
            purchases = report.total_purchases,
            revenue = report.total_revenue,
            warnings = report.data_quality_warnings,
            "reconciliation complete"
        );
        Ok(report)
    }
}

/// What the event group alone tells us about a session.
#[derive(Debug, Clone, Default)]
struct GroupFacts {
    /// At least one purchase event resolved against the catalog.
    resolved_purchase: bool,
    /// Category of the first resolvable event's product.
    resolved_category: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SessionBucket {
    Purchased,
    Abandoned,
    /// Expired, failed, or still open: counted toward sessions only.
    Open,
}

/// Explicit outcome wins; otherwise the event stream decides. A purchase
/// that only exists as an orphan event stays out of the conversion
/// numerator.
fn bucket_for(session: &Session, facts: &GroupFacts) -> SessionBucket {
    match session.outcome {
        Some(SessionOutcome::Purchased) => SessionBucket::Purchased,
        Some(SessionOutcome::Abandoned) => SessionBucket::Abandoned,
        Some(SessionOutcome::Expired) | Some(SessionOutcome::Failed) => SessionBucket::Open,
        None => {
            if facts.resolved_purchase {
                SessionBucket::Purchased
            } else {
                SessionBucket::Open
            }
        }
    }
}

impl IntegrationReport {
    fn count_session(&mut self, category: &str, bucket: SessionBucket) {
        let stats = self
            .by_category
            .entry(category.to_string())
            .or_insert_with(CategoryStats::default);
        stats.sessions += 1;
        self.total_sessions += 1;
        match bucket {
            SessionBucket::Purchased => {
                stats.purchases += 1;
                self.total_purchases += 1;
            }
            SessionBucket::Abandoned => {
                stats.abandonments += 1;
                self.total_abandonments += 1;
            }
            SessionBucket::Open => {}
        }
    }
}
