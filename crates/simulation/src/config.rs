//! Simulation run configuration.
//!
//! Arrival and abandonment behavior are data profiles rather than closures:
//! configs stay serializable, comparable, and trivially deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cyberday_core::Ttl;

/// Session arrival rate over virtual time (expected sessions per tick).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalProfile {
    /// Flat rate for the whole run.
    Constant { per_tick: f64 },
    /// Flash-sale surge: `base` outside `[start, end)`, `peak` inside.
    Spike {
        base: f64,
        peak: f64,
        start: u64,
        end: u64,
    },
}

impl ArrivalProfile {
    pub fn rate_at(&self, tick: u64) -> f64 {
        match self {
            ArrivalProfile::Constant { per_tick } => per_tick.max(0.0),
            ArrivalProfile::Spike {
                base,
                peak,
                start,
                end,
            } => {
                if (*start..*end).contains(&tick) {
                    peak.max(0.0)
                } else {
                    base.max(0.0)
                }
            }
        }
    }
}

/// Probability that a session abandons instead of purchasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonmentProfile {
    Uniform { probability: f64 },
    /// Per-category probabilities with a fallback for unlisted categories.
    PerCategory {
        by_category: BTreeMap<String, f64>,
        default: f64,
    },
}

impl AbandonmentProfile {
    pub fn probability(&self, category: &str) -> f64 {
        let p = match self {
            AbandonmentProfile::Uniform { probability } => *probability,
            AbandonmentProfile::PerCategory {
                by_category,
                default,
            } => *by_category.get(category).unwrap_or(default),
        };
        p.clamp(0.0, 1.0)
    }
}

/// Full configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seed: u64,
    pub duration_ticks: u64,
    pub arrival: ArrivalProfile,
    /// Weighted category preferences. Empty means: equal weight over every
    /// category present in the catalog snapshot.
    pub category_weights: Vec<(String, f64)>,
    pub abandonment: AbandonmentProfile,
    /// TTL applied to every cart event written by the run.
    pub cart_ttl: Ttl,
    /// TTL applied to session records (usually longer than `cart_ttl`).
    pub session_ttl: Ttl,
    /// Bounded retry budget per store write.
    pub max_write_attempts: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            duration_ticks: 100,
            arrival: ArrivalProfile::Constant { per_tick: 1.0 },
            category_weights: Vec::new(),
            abandonment: AbandonmentProfile::Uniform { probability: 0.3 },
            cart_ttl: Ttl::ticks(500),
            session_ttl: Ttl::ticks(1_000),
            max_write_attempts: 3,
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_duration(mut self, ticks: u64) -> Self {
        self.duration_ticks = ticks;
        self
    }

    pub fn with_arrival(mut self, arrival: ArrivalProfile) -> Self {
        self.arrival = arrival;
        self
    }

    pub fn with_abandonment(mut self, abandonment: AbandonmentProfile) -> Self {
        self.abandonment = abandonment;
        self
    }

    pub fn with_category_weights(mut self, weights: Vec<(String, f64)>) -> Self {
        self.category_weights = weights;
        self
    }
}
