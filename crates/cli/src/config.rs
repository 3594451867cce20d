//! Environment-variable configuration for the `run` command.

use anyhow::{Context, Result};

use cyberday_core::Ttl;
use cyberday_simulation::{AbandonmentProfile, ArrivalProfile, SimulationConfig};

/// Configuration assembled from `CYBERDAY_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Path to the catalog fixture (JSON array of products).
    pub catalog_path: String,
    pub simulation: SimulationConfig,
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests inject maps instead of the real
    /// environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let catalog_path = lookup("CYBERDAY_CATALOG").unwrap_or_else(|| {
            tracing::warn!("CYBERDAY_CATALOG not set; using ./catalog.json");
            "catalog.json".to_string()
        });

        let seed = parse_or(&lookup, "CYBERDAY_SEED", 42u64)?;
        let duration = parse_or(&lookup, "CYBERDAY_DURATION", 500u64)?;
        let rate = parse_or(&lookup, "CYBERDAY_ARRIVAL", 2.0f64)?;
        let abandonment = parse_or(&lookup, "CYBERDAY_ABANDONMENT", 0.3f64)?;
        let cart_ttl = parse_or(&lookup, "CYBERDAY_CART_TTL", 1_000u64)?;
        let session_ttl = parse_or(&lookup, "CYBERDAY_SESSION_TTL", 2_000u64)?;

        // Optional flash-sale window: "start:end:peak".
        let arrival = match lookup("CYBERDAY_SPIKE") {
            Some(raw) => parse_spike(&raw, rate)?,
            None => ArrivalProfile::Constant { per_tick: rate },
        };

        let simulation = SimulationConfig {
            seed,
            duration_ticks: duration,
            arrival,
            category_weights: Vec::new(),
            abandonment: AbandonmentProfile::Uniform {
                probability: abandonment,
            },
            cart_ttl: Ttl::ticks(cart_ttl),
            session_ttl: Ttl::ticks(session_ttl),
            max_write_attempts: 3,
        };

        Ok(Self {
            catalog_path,
            simulation,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

fn parse_spike(raw: &str, base: f64) -> Result<ArrivalProfile> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [start, end, peak] = parts.as_slice() else {
        anyhow::bail!("invalid CYBERDAY_SPIKE {raw:?} (expected start:end:peak)");
    };
    Ok(ArrivalProfile::Spike {
        base,
        peak: peak
            .trim()
            .parse()
            .with_context(|| format!("invalid CYBERDAY_SPIKE peak: {peak:?}"))?,
        start: start
            .trim()
            .parse()
            .with_context(|| format!("invalid CYBERDAY_SPIKE start: {start:?}"))?,
        end: end
            .trim()
            .parse()
            .with_context(|| format!("invalid CYBERDAY_SPIKE end: {end:?}"))?,
    })
}
