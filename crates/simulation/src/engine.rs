//! The simulation engine: virtual clock loop, session generation, store
//! writes with bounded retry.

use std::collections::{BTreeMap, HashMap};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use cyberday_catalog::{CatalogStore, Product};
use cyberday_core::{CancelToken, CartEventId, ProductId, SessionId, StoreError, Tick, VirtualClock};
use cyberday_events::{CartEvent, EventKind, EventStore, Session, SessionOutcome};

use crate::config::SimulationConfig;
use crate::summary::SimulationSummary;

/// Fatal simulation failure.
///
/// Only raised before the first tick executes; everything after that point
/// is absorbed into the summary (failed sessions, retries, stock-outs).
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A store adapter was unreachable during the pre-run connectivity
    /// proof. No state has been mutated.
    #[error("adapter unreachable before simulation start: {0}")]
    Connectivity(#[source] StoreError),

    /// The run cannot produce sessions with this configuration.
    #[error("invalid simulation configuration: {0}")]
    InvalidConfig(String),
}

/// Deterministic shopping-traffic generator over two store adapters.
///
/// `run` is a pure function of `(seed, config)` with respect to the event
/// sequence it generates: the only mutable state is the per-run virtual
/// clock and RNG, both scoped to the call.
pub struct SimulationEngine<C, E> {
    catalog: C,
    store: E,
}

impl<C, E> SimulationEngine<C, E>
where
    C: CatalogStore,
    E: EventStore,
{
    pub fn new(catalog: C, store: E) -> Self {
        Self { catalog, store }
    }

    /// Run one simulation to completion (or cancellation).
    pub fn run(
        &self,
        config: &SimulationConfig,
        cancel: &CancelToken,
    ) -> Result<SimulationSummary, SimulationError> {
        // Connectivity proof: one read per adapter, before any mutation.
        // Failure here is the only fatal path.
        let products = self
            .catalog
            .snapshot()
            .map_err(SimulationError::Connectivity)?;
        self.store
            .get_all_active(Tick::ZERO)
            .map_err(SimulationError::Connectivity)?;

        let mut summary = SimulationSummary::new(config.seed);
        if config.duration_ticks == 0 {
            return Ok(summary);
        }

        if products.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "catalog snapshot is empty".to_string(),
            ));
        }

        let by_category = index_by_category(products);
        let weights = effective_weights(config, &by_category)?;
        let stock = by_category
            .values()
            .flatten()
            .map(|p| (p.id.clone(), i64::from(p.stock)))
            .collect();

        info!(
            seed = config.seed,
            duration = config.duration_ticks,
            categories = weights.len(),
            "simulation starting"
        );

        let mut state = RunState {
            store: &self.store,
            config,
            weights,
            by_category,
            stock,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            clock: VirtualClock::new(),
            arrival_carry: 0.0,
            next_event_id: 1,
            summary: &mut summary,
        };

        for t in 0..config.duration_ticks {
            if cancel.is_cancelled() {
                state.summary.cancelled = true;
                info!(tick = t, "simulation cancelled; returning partial summary");
                break;
            }
            state.tick(t);
            state.clock.advance();
            state.summary.ticks_run = t + 1;
        }

        info!(
            sessions = summary.sessions_started,
            purchased = summary.purchased,
            abandoned = summary.abandoned,
            failed = summary.failed,
            revenue = summary.revenue,
            lost_revenue = summary.lost_revenue,
            "simulation finished"
        );
        Ok(summary)
    }
}

/// Mutable per-run state, scoped to one `run` invocation.
struct RunState<'a, E> {
    store: &'a E,
    config: &'a SimulationConfig,
    weights: Vec<(String, f64)>,
    by_category: BTreeMap<String, Vec<Product>>,
    stock: HashMap<ProductId, i64>,
    rng: ChaCha8Rng,
    clock: VirtualClock,
    arrival_carry: f64,
    next_event_id: u64,
    summary: &'a mut SimulationSummary,
}

impl<E: EventStore> RunState<'_, E> {
    fn tick(&mut self, t: u64) {
        // Fractional arrival accumulation keeps low rates deterministic
        // without per-tick coin flips.
        self.arrival_carry += self.config.arrival.rate_at(t);
        while self.arrival_carry >= 1.0 {
            self.arrival_carry -= 1.0;
            self.spawn_session(self.clock.now());
        }
    }

    fn spawn_session(&mut self, tick: Tick) {
        self.summary.sessions_started += 1;

        let session_id = SessionId::from_bytes(self.rng.r#gen());
        let category = weighted_choice(&mut self.rng, &self.weights).to_string();

        // Sample the whole session up front; writes never touch the RNG, so
        // the generated sequence is identical even when the store flakes.
        let mut adds: Vec<(usize, i64)> = Vec::new();
        let n_adds = self.rng.gen_range(1..=3);
        let n_products = self.by_category.get(&category).map_or(0, Vec::len);
        if n_products > 0 {
            for _ in 0..n_adds {
                let idx = self.rng.gen_range(0..n_products);
                let qty = self.rng.gen_range(1..=5i64);
                adds.push((idx, qty));
            }
        }
        let with_remove = adds.len() >= 2 && self.rng.gen_bool(0.25);
        let wants_purchase =
            self.rng.r#gen::<f64>() >= self.config.abandonment.probability(&category);

        let session = Session::open(session_id, tick, category.clone());
        let session_ttl = self.config.session_ttl;
        if self
            .write(|store| store.begin_session(session.clone(), session_ttl))
            .is_err()
        {
            self.session_failed(session_id);
            return;
        }

        if adds.is_empty() {
            // Weighted category with no catalog products: nothing to browse.
            self.close_session(session_id, SessionOutcome::Abandoned);
            return;
        }

        let mut sequence: u32 = 0;
        let mut planned: Vec<(EventKind, usize, i64)> =
            adds.iter().map(|&(idx, qty)| (EventKind::Add, idx, qty)).collect();
        if with_remove {
            let (idx, qty) = adds[0];
            planned.push((EventKind::Remove, idx, qty));
        }

        for (offset, &(kind, idx, qty)) in planned.iter().enumerate() {
            let at = tick.plus(offset as u64);
            if at.value() >= self.config.duration_ticks {
                // Virtual time ran out mid-browse.
                self.close_session(session_id, SessionOutcome::Expired);
                return;
            }
            sequence += 1;
            let product = &self.by_category[&category][idx];
            let event = CartEvent {
                id: CartEventId::new(self.next_event_id),
                session_id,
                sequence,
                product_id: product.id.clone(),
                kind,
                quantity: qty,
                at,
            };
            self.next_event_id += 1;
            let cart_ttl = self.config.cart_ttl;
            if self.write(|store| store.append_event(event.clone(), cart_ttl)).is_err() {
                self.session_failed(session_id);
                return;
            }
            self.summary.events_written += 1;
        }

        if !wants_purchase {
            self.close_session(session_id, SessionOutcome::Abandoned);
            return;
        }

        let purchase_at = tick.plus(planned.len() as u64);
        if purchase_at.value() >= self.config.duration_ticks {
            self.close_session(session_id, SessionOutcome::Expired);
            return;
        }

        // Checkout on the last added product.
        let (idx, wanted_qty) = adds[adds.len() - 1];
        let product = self.by_category[&category][idx].clone();
        let available = self.stock.get(&product.id).copied().unwrap_or(0);

        if available <= 0 {
            // Sold out entirely: the sale is lost.
            self.summary.lost_revenue += product.revenue_for(wanted_qty.unsigned_abs());
            self.summary
                .stock_outs
                .entry(product.id.clone())
                .or_insert(purchase_at);
            debug!(product = %product.id, tick = purchase_at.value(), "stock-out, sale lost");
            self.close_session(session_id, SessionOutcome::Abandoned);
            return;
        }

        // Partial checkout when stock can't cover the full quantity.
        let sold_qty = wanted_qty.min(available);
        let lost_qty = wanted_qty - sold_qty;
        if lost_qty > 0 {
            self.summary.lost_revenue += product.revenue_for(lost_qty.unsigned_abs());
            self.summary
                .stock_outs
                .entry(product.id.clone())
                .or_insert(purchase_at);
        }

        sequence += 1;
        let event = CartEvent {
            id: CartEventId::new(self.next_event_id),
            session_id,
            sequence,
            product_id: product.id.clone(),
            kind: EventKind::Purchase,
            quantity: sold_qty,
            at: purchase_at,
        };
        self.next_event_id += 1;
        let cart_ttl = self.config.cart_ttl;
        if self.write(|store| store.append_event(event.clone(), cart_ttl)).is_err() {
            self.session_failed(session_id);
            return;
        }
        self.summary.events_written += 1;
        self.summary.revenue += product.revenue_for(sold_qty.unsigned_abs());
        if let Some(s) = self.stock.get_mut(&product.id) {
            *s -= sold_qty;
        }

        self.close_session(session_id, SessionOutcome::Purchased);
    }

    /// Apply the bounded retry policy to one store write.
    fn write(&mut self, mut op: impl FnMut(&E) -> Result<(), StoreError>) -> Result<(), StoreError> {
        let attempts = self.config.max_write_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(self.store) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    self.summary.write_retries += 1;
                    debug!(error = %e, attempt, "store write failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Record a terminal outcome and bump the matching counter.
    fn close_session(&mut self, session_id: SessionId, outcome: SessionOutcome) {
        if self
            .write(|store| store.set_session_outcome(session_id, outcome))
            .is_err()
        {
            self.session_failed(session_id);
            return;
        }
        match outcome {
            SessionOutcome::Purchased => self.summary.purchased += 1,
            SessionOutcome::Abandoned => self.summary.abandoned += 1,
            SessionOutcome::Expired => self.summary.expired += 1,
            SessionOutcome::Failed => self.summary.failed += 1,
        }
    }

    /// Retry budget exhausted: mark the session failed and move on. The
    /// outcome write is best-effort; the run never aborts for one session.
    fn session_failed(&mut self, session_id: SessionId) {
        warn!(session = %session_id, "write retries exhausted, marking session failed");
        self.summary.failed += 1;
        let _ = self
            .store
            .set_session_outcome(session_id, SessionOutcome::Failed);
    }
}

fn index_by_category(products: Vec<Product>) -> BTreeMap<String, Vec<Product>> {
    let mut by_category: BTreeMap<String, Vec<Product>> = BTreeMap::new();
    for p in products {
        by_category.entry(p.category.clone()).or_default().push(p);
    }
    // Stable product order within each category, independent of snapshot order.
    for products in by_category.values_mut() {
        products.sort_by(|a, b| a.id.cmp(&b.id));
    }
    by_category
}

fn effective_weights(
    config: &SimulationConfig,
    by_category: &BTreeMap<String, Vec<Product>>,
) -> Result<Vec<(String, f64)>, SimulationError> {
    let weights: Vec<(String, f64)> = if config.category_weights.is_empty() {
        by_category.keys().map(|c| (c.clone(), 1.0)).collect()
    } else {
        config
            .category_weights
            .iter()
            .filter(|(_, w)| *w > 0.0)
            .cloned()
            .collect()
    };

    if weights.is_empty() {
        return Err(SimulationError::InvalidConfig(
            "no category has positive weight".to_string(),
        ));
    }
    Ok(weights)
}

fn weighted_choice<'a>(rng: &mut ChaCha8Rng, weights: &'a [(String, f64)]) -> &'a str {
    let total: f64 = weights.iter().map(|(_, w)| w.max(0.0)).sum();
    let mut roll = rng.r#gen::<f64>() * total;
    for (name, w) in weights {
        let w = w.max(0.0);
        if roll < w {
            return name;
        }
        roll -= w;
    }
    // Floating-point edge: fall back to the last entry.
    &weights[weights.len() - 1].0
}
