use serde::{Deserialize, Serialize};

use cyberday_core::{CartEventId, ProductId, SessionId, Tick};

/// Kind of cart activity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Add,
    Remove,
    Purchase,
}

/// A cart event.
///
/// References its session and product by id only — the two stores are
/// independent, so neither reference is an enforced foreign key. The
/// reconciler treats every product lookup as optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEvent {
    /// Globally unique, monotonically increasing within a run.
    pub id: CartEventId,
    pub session_id: SessionId,
    /// Monotonic position within the session's stream (starts at 1).
    pub sequence: u32,
    pub product_id: ProductId,
    pub kind: EventKind,
    /// Positive when well-formed; non-positive values are data-quality
    /// violations the reconciler counts and excludes.
    pub quantity: i64,
    pub at: Tick,
}
