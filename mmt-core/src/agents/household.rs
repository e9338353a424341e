//! Household agents: workers, consumers, and retail investors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AgentId, Commodity, Money, Rate, Sector};

/// Labor state. Gig work counts as working for unemployment statistics
/// but sits outside standard sector matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Employment {
    Unemployed,
    Gig,
    Employed,
}

impl Employment {
    pub fn is_working(self) -> bool {
        !matches!(self, Employment::Unemployed)
    }
}

/// A single household. Fields cover both engines: the government engine
/// reads/writes the fiscal side (money, savings, debt, expectations), the
/// labor engine the employment side, and the orchestrator the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub money: Money,
    pub employment: Employment,
    pub income: Money,
    pub job_guarantee_participant: bool,
    pub savings: Money,
    pub debt: Money,
    /// Ability in [0, 1]; grows with completed education.
    pub skill_level: f64,
    /// Output per tick worked; compounds geometrically.
    pub productivity: f64,
    pub employer: Option<AgentId>,
    pub sector: Option<Sector>,
    pub inflation_expectation: Rate,
    pub foreign_currency: Money,
    pub stocks: f64,
    pub bonds: f64,
    /// Quantities held, not values.
    pub commodities: HashMap<Commodity, f64>,
    pub job_search_active: bool,
    pub wage_expectation: Money,
    pub unemployed_duration: u32,
    pub education_level: u32,
    /// 0 when not studying; ticks since enrollment otherwise.
    pub education_progress: u32,
    pub gig_worker: bool,
    pub union_member: bool,
}

impl Household {
    /// A freshly reset household. Skill and inflation expectation are
    /// scenario-supplied; everything else starts at the reset constants.
    pub fn new() -> Self {
        Self {
            money: 1000.0,
            employment: Employment::Unemployed,
            income: 0.0,
            job_guarantee_participant: false,
            savings: 0.0,
            debt: 0.0,
            skill_level: 0.0,
            productivity: 1.0,
            employer: None,
            sector: None,
            inflation_expectation: 0.0,
            foreign_currency: 0.0,
            stocks: 0.0,
            bonds: 0.0,
            commodities: Commodity::all().iter().map(|&c| (c, 0.0)).collect(),
            job_search_active: false,
            wage_expectation: 0.0,
            unemployed_duration: 0,
            education_level: 0,
            education_progress: 0,
            gig_worker: false,
            union_member: false,
        }
    }

    pub fn with_money(mut self, money: Money) -> Self {
        self.money = money;
        self
    }

    pub fn with_skill(mut self, skill: f64) -> Self {
        self.skill_level = skill;
        self
    }

    pub fn with_income(mut self, income: Money) -> Self {
        self.income = income;
        self
    }

    pub fn with_employment(mut self, employment: Employment) -> Self {
        self.employment = employment;
        self
    }

    pub fn with_sector(mut self, sector: Sector) -> Self {
        self.sector = Some(sector);
        self
    }

    pub fn with_productivity(mut self, productivity: f64) -> Self {
        self.productivity = productivity;
        self
    }

    pub fn with_inflation_expectation(mut self, expectation: Rate) -> Self {
        self.inflation_expectation = expectation;
        self
    }

    pub fn commodity_holding(&self, commodity: Commodity) -> f64 {
        self.commodities.get(&commodity).copied().unwrap_or(0.0)
    }

    pub fn add_commodity(&mut self, commodity: Commodity, quantity: f64) {
        *self.commodities.entry(commodity).or_insert(0.0) += quantity;
    }
}

impl Default for Household {
    fn default() -> Self {
        Self::new()
    }
}
