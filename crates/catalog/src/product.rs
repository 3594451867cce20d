use serde::{Deserialize, Serialize};

use cyberday_core::ProductId;

/// A catalog product record.
///
/// Arrives already validated from the upstream extract/transform stage
/// (non-negative price, non-empty category); the core does not re-validate
/// catalog fields beyond existence checks during joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    pub rating: f64,
    pub stock: u32,
}

impl Product {
    /// Revenue contribution of `quantity` units, saturating on overflow.
    pub fn revenue_for(&self, quantity: u64) -> u64 {
        self.unit_price.saturating_mul(quantity)
    }
}
