//! Virtual time: discrete ticks, independent of wall-clock time.

use serde::{Deserialize, Serialize};

/// A point in virtual time.
///
/// The simulation advances in discrete ticks; nothing in the core ever reads
/// the wall clock. Ticks order totally, so `(tick, session, sequence)` gives
/// a deterministic replay order.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Saturating advance by `n` ticks.
    pub fn plus(&self, n: u64) -> Tick {
        Tick(self.0.saturating_add(n))
    }
}

impl core::fmt::Display for Tick {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Store-enforced record lifetime, in ticks.
///
/// A record written at tick `t` with TTL `d` is visible to reads at `as_of`
/// iff `as_of < t + d`. Expiry is evaluated by the store on read, never by
/// the engines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ttl(pub u64);

impl Ttl {
    pub fn ticks(value: u64) -> Self {
        Self(value)
    }

    /// The first tick at which a record written at `at` is no longer visible.
    pub fn expires_at(&self, at: Tick) -> Tick {
        at.plus(self.0)
    }
}

/// Per-run virtual clock.
///
/// Scoped to one `run` invocation (passed through explicitly, never
/// process-wide), so independent simulations can run concurrently in the
/// same process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now: Tick,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(tick: Tick) -> Self {
        Self { now: tick }
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    /// Advance by one tick and return the new time.
    pub fn advance(&mut self) -> Tick {
        self.now = self.now.plus(1);
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_in_discrete_ticks() {
        let mut clock = VirtualClock::new();
        assert_eq!(clock.now(), Tick::ZERO);
        assert_eq!(clock.advance(), Tick(1));
        assert_eq!(clock.advance(), Tick(2));
        assert_eq!(clock.now(), Tick(2));
    }

    #[test]
    fn ttl_visibility_boundary_is_exclusive() {
        let ttl = Ttl::ticks(5);
        let written_at = Tick(10);
        let expires = ttl.expires_at(written_at);
        assert_eq!(expires, Tick(15));
        // Visible strictly before expiry, invisible from expiry onwards.
        assert!(Tick(14) < expires);
        assert!(Tick(15) >= expires);
    }

    #[test]
    fn tick_plus_saturates() {
        assert_eq!(Tick(u64::MAX).plus(1), Tick(u64::MAX));
    }
}
