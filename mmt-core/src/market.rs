//! Financial market seam.
//!
//! The orchestrator only ever reads average asset prices; the book that
//! produces them lives outside this crate. `FixedPriceMarket` is the
//! stand-in used by runs and tests.

use serde::{Deserialize, Serialize};

use crate::types::{AssetKind, Money};

/// Read-only price feed consulted during household asset trading.
pub trait AssetPriceSource {
    fn average_price(&self, kind: AssetKind) -> Money;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPriceMarket {
    pub stock: Money,
    pub bond: Money,
}

impl Default for FixedPriceMarket {
    fn default() -> Self {
        Self {
            stock: 100.0,
            bond: 1_000.0,
        }
    }
}

impl AssetPriceSource for FixedPriceMarket {
    fn average_price(&self, kind: AssetKind) -> Money {
        match kind {
            AssetKind::Stock => self.stock,
            AssetKind::Bond => self.bond,
        }
    }
}
