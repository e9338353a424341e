//! Agent-based macroeconomic simulation core.
//!
//! A [`scenario::Scenario`] owns a shared agent [`population::Population`]
//! and advances it one tick at a time through a sovereign-currency
//! [`government::Government`], a sectoral [`labor::LaborMarket`], and the
//! household, corporate, and foreign behavioral passes.

pub mod agents;
pub mod government;
pub mod labor;
pub mod market;
pub mod population;
pub mod scenario;
pub mod types;

pub use agents::*;
pub use government::*;
pub use labor::*;
pub use market::*;
pub use population::*;
pub use scenario::*;
pub use types::*;
