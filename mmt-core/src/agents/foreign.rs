//! Foreign investors holding a cross-border portfolio.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Commodity, Money};

/// Domestic-economy holdings of a foreign agent. Stock and bond entries
/// are money values while commodity entries are quantities; the
/// divestment rule totals them uniformly anyway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub stocks: Money,
    pub bonds: Money,
    pub commodities: HashMap<Commodity, f64>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self {
            stocks: 0.0,
            bonds: 0.0,
            commodities: Commodity::all().iter().map(|&c| (c, 0.0)).collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.stocks + self.bonds + self.commodities.values().sum::<f64>()
    }

    /// Shrink every entry proportionally to release up to `amount`;
    /// returns what was actually released. Empty portfolios release 0.
    pub fn divest(&mut self, amount: f64) -> f64 {
        let total = self.total();
        if total == 0.0 {
            return 0.0;
        }
        let released = amount.min(total);
        let factor = 1.0 - released / total;
        self.stocks *= factor;
        self.bonds *= factor;
        for quantity in self.commodities.values_mut() {
            *quantity *= factor;
        }
        released
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Foreign {
    pub foreign_currency: Money,
    pub domestic_currency: Money,
    pub portfolio: Portfolio,
}

impl Foreign {
    pub fn new() -> Self {
        Self {
            foreign_currency: 10_000.0,
            domestic_currency: 0.0,
            portfolio: Portfolio::new(),
        }
    }

    pub fn with_foreign_currency(mut self, amount: Money) -> Self {
        self.foreign_currency = amount;
        self
    }
}

impl Default for Foreign {
    fn default() -> Self {
        Self::new()
    }
}
