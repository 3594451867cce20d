use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cyberday_core::{ProductId, Tick};

/// Result of one simulation run.
///
/// Recoverable conditions (failed sessions, stock-outs) live here rather
/// than in an error: the caller decides whether the counts are acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub ticks_run: u64,
    pub sessions_started: u64,
    pub purchased: u64,
    pub abandoned: u64,
    pub expired: u64,
    /// Sessions whose writes exhausted the retry budget (distinct from
    /// abandoned).
    pub failed: u64,
    pub events_written: u64,
    /// Individual store-write retries that eventually succeeded.
    pub write_retries: u64,
    /// Revenue written as purchase events, in smallest currency unit.
    pub revenue: u64,
    /// Would-be revenue lost to stock-outs.
    pub lost_revenue: u64,
    /// First stock-out tick per product.
    pub stock_outs: BTreeMap<ProductId, Tick>,
    /// True when the run stopped early on a cancellation signal.
    pub cancelled: bool,
}

impl SimulationSummary {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Sessions that reached any terminal state.
    pub fn sessions_closed(&self) -> u64 {
        self.purchased + self.abandoned + self.expired + self.failed
    }
}
