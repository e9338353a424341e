//! Shared scalar aliases and the closed enums used across the engines.
//!
//! Maps keyed by these enums are only ever iterated through `all()`, so
//! per-tick loops consume randomness in a fixed order.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Domestic currency amount.
pub type Money = f64;

/// Dimensionless rate: interest, inflation, probabilities.
pub type Rate = f64;

new_key_type! {
    /// Arena key for any agent in the population.
    pub struct AgentId;
}

/// Employment sectors corporates belong to and households work in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Manufacturing,
    Services,
    Technology,
}

impl Sector {
    pub fn all() -> [Sector; 3] {
        [Sector::Manufacturing, Sector::Services, Sector::Technology]
    }
}

/// Commodities households and foreign investors hold quantities of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Commodity {
    Oil,
    Gold,
    Wheat,
}

impl Commodity {
    pub fn all() -> [Commodity; 3] {
        [Commodity::Oil, Commodity::Gold, Commodity::Wheat]
    }

    /// Price at scenario reset.
    pub fn initial_price(self) -> Money {
        match self {
            Commodity::Oil => 50.0,
            Commodity::Gold => 1500.0,
            Commodity::Wheat => 5.0,
        }
    }
}

/// Asset classes the financial market quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Stock,
    Bond,
}
