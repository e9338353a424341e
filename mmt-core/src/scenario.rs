//! Scenario orchestrator.
//!
//! Owns the population, both engines, and commodity prices; each tick
//! runs the government, then the labor market, then the orchestrator's
//! own phases: household incomes and portfolio decisions, corporate P&L
//! and staffing, international trade, unit-level asset trading, and the
//! commodity random walk. Later phases see earlier mutations; the phase
//! order is the consistency model.

use std::collections::HashMap;

use rand::Rng;
use rand_distr::{Dirichlet, Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::agents::{Corporate, Foreign, Household};
use crate::government::{Government, GovernmentConfig};
use crate::labor::{LaborConfig, LaborMarket};
use crate::market::AssetPriceSource;
use crate::population::Population;
use crate::types::{AgentId, AssetKind, Commodity, Money};

/// Revenue per unit of employee productivity.
pub const REVENUE_PER_OUTPUT: f64 = 10.0;
/// Corporates stop hiring at this payroll size.
pub const MAX_CORPORATE_HEADCOUNT: usize = 10;
/// Cash households keep liquid before investing the surplus.
pub const INVESTMENT_CASH_FLOOR: Money = 1_000.0;
/// Std dev of the per-tick commodity price shock.
pub const COMMODITY_PRICE_VOLATILITY: f64 = 0.02;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub households: usize,
    pub corporates: usize,
    pub foreigns: usize,
    /// Openings each corporate posts at reset.
    pub job_openings: u32,
    pub government: GovernmentConfig,
    pub labor: LaborConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            households: 100,
            corporates: 5,
            foreigns: 3,
            job_openings: 0,
            government: GovernmentConfig::default(),
            labor: LaborConfig::default(),
        }
    }
}

/// Sampling distributions used inside the tick. Rebuilt rather than
/// serialized; checkpoints carry no RNG state.
#[derive(Debug, Clone)]
struct Draws {
    invest_split: Dirichlet<f64, 3>,
    price_noise: Normal<f64>,
}

impl Draws {
    fn new() -> Self {
        Self {
            invest_split: Dirichlet::new([1.0; 3]).expect("uniform alpha is valid"),
            price_noise: Normal::new(0.0, COMMODITY_PRICE_VOLATILITY)
                .expect("volatility is positive and finite"),
        }
    }
}

impl Default for Draws {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub population: Population,
    pub government: Government,
    pub labor_market: LaborMarket,
    pub commodity_prices: HashMap<Commodity, Money>,
    pub tick: u64,
    #[serde(skip, default)]
    draws: Draws,
}

impl Scenario {
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            government: Government::new(config.government.clone()),
            labor_market: LaborMarket::new(config.labor.clone()),
            population: Population::new(),
            commodity_prices: initial_commodity_prices(),
            tick: 0,
            draws: Draws::new(),
            config,
        }
    }

    /// Rebuild both engines, repopulate the arena with reset-state
    /// agents, restore commodity prices, zero the tick.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.government = Government::new(self.config.government.clone());
        self.labor_market = LaborMarket::new(self.config.labor.clone());
        self.population = Population::new();
        self.commodity_prices = initial_commodity_prices();
        self.tick = 0;

        let expectation = self.config.government.inflation_target;
        for _ in 0..self.config.households {
            self.population.add_household(
                Household::new()
                    .with_skill(rng.random())
                    .with_inflation_expectation(expectation),
            );
        }
        // sectors assigned round-robin; an empty sector list yields no corporates
        for (_, &sector) in
            (0..self.config.corporates).zip(self.config.labor.sectors.iter().cycle())
        {
            self.population
                .add_corporate(Corporate::new(sector).with_job_openings(self.config.job_openings));
        }
        for _ in 0..self.config.foreigns {
            self.population.add_foreign(Foreign::new());
        }
    }

    /// One full simulation tick.
    pub fn step<R: Rng>(&mut self, market: &dyn AssetPriceSource, rng: &mut R) {
        let tick = self.tick;
        // 1. GOVERNMENT
        self.government.step(tick, &mut self.population, rng);
        // 2. LABOR MARKET
        self.labor_market
            .step(tick, &mut self.population, &mut self.government, rng);
        // 3. HOUSEHOLD INCOMES & PORTFOLIOS
        self.update_households(rng);
        // 4. CORPORATE P&L AND STAFFING
        self.update_corporates();
        // 5. INTERNATIONAL TRADE
        self.international_trade(rng);
        // 6. UNIT ASSET TRADES
        self.financial_markets(market, rng);
        // 7. COMMODITY RANDOM WALK
        self.update_commodity_prices(rng);

        self.tick += 1;

        #[cfg(feature = "telemetry")]
        tracing::info!(
            target: "scenario",
            tick,
            price_oil = self.commodity_price(Commodity::Oil),
            price_gold = self.commodity_price(Commodity::Gold),
            price_wheat = self.commodity_price(Commodity::Wheat),
        );
    }

    /// Assign incomes (guarantee wage beats market wage beats nothing),
    /// run each household's saving/borrowing/investment rules, then the
    /// growth and expectation updates run a second time after the
    /// government pass.
    pub fn update_households<R: Rng>(&mut self, rng: &mut R) {
        let jg_wage = self.government.config.job_guarantee_wage;
        let growth = 1.0 + self.government.config.productivity_growth_rate;
        let inflation = self.government.inflation_rate;
        let labor = &self.labor_market;
        let prices = &self.commodity_prices;
        let invest_split = &self.draws.invest_split;

        self.population.for_each_household_mut(|h| {
            h.income = if h.job_guarantee_participant {
                jg_wage
            } else if h.employment.is_working() {
                labor.wage_for(h)
            } else {
                0.0
            };

            // save a slice of the income gap, or borrow up to the floor
            if h.income > h.money {
                let saved = (h.income - h.money) * 0.1;
                h.savings += saved;
                h.money -= saved;
            } else if h.money < 100.0 {
                let borrowed = (100.0 - h.money).min(50.0);
                h.debt += borrowed;
                h.money += borrowed;
            }

            if h.money > INVESTMENT_CASH_FLOOR {
                let investment = (h.money - INVESTMENT_CASH_FLOOR) * 0.2;
                h.money -= investment;
                let split: [f64; 3] = invest_split.sample(rng);
                h.stocks += investment * split[0];
                h.bonds += investment * split[1];
                let sleeve = investment * split[2];
                for commodity in Commodity::all() {
                    if let Some(&price) = prices.get(&commodity) {
                        h.add_commodity(commodity, sleeve / 3.0 / price);
                    }
                }
            }

            h.productivity *= growth;
            h.inflation_expectation = h.inflation_expectation * 0.9 + inflation * 0.1;
        });
    }

    /// Mark production, revenue, profit, and tax to the current payroll,
    /// then one staffing move per corporate: profitable under-strength
    /// books hire the best unemployed, loss-makers shed their weakest.
    pub fn update_corporates(&mut self) {
        let corporate_ids = self.population.corporate_ids().to_vec();
        for corp_id in corporate_ids {
            let (production, expenses) = {
                let Some(corp) = self.population.corporate(corp_id) else {
                    continue;
                };
                let mut production = 0.0;
                let mut expenses = 0.0;
                for &worker in &corp.employees {
                    if let Some(h) = self.population.household(worker) {
                        production += h.productivity;
                        expenses += h.income;
                    }
                }
                (production, expenses)
            };
            let revenue = production * REVENUE_PER_OUTPUT;
            let profit = revenue - expenses;
            let tax = self.government.progressive_tax(profit);

            let headcount = {
                let Some(corp) = self.population.corporate_mut(corp_id) else {
                    continue;
                };
                corp.production = production;
                corp.revenue = revenue;
                corp.profit = profit;
                corp.tax_paid = tax;
                corp.capital += profit - tax;
                corp.headcount()
            };

            if profit > 0.0 && headcount < MAX_CORPORATE_HEADCOUNT {
                if let Some(worker) = self.best_unemployed() {
                    self.population.hire(corp_id, worker);
                }
            } else if profit < 0.0 && headcount > 1 {
                if let Some(worker) = self.weakest_employee(corp_id) {
                    self.population.fire(corp_id, worker);
                }
            }
        }
    }

    /// Highest-skill unemployed household; earliest registered wins ties.
    fn best_unemployed(&self) -> Option<AgentId> {
        let mut best: Option<(AgentId, f64)> = None;
        for &id in self.population.household_ids() {
            let Some(h) = self.population.household(id) else {
                continue;
            };
            if !h.employment.is_working() && best.is_none_or(|(_, skill)| h.skill_level > skill) {
                best = Some((id, h.skill_level));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Lowest-productivity employee on the payroll; earliest hired wins
    /// ties.
    fn weakest_employee(&self, corp_id: AgentId) -> Option<AgentId> {
        let corp = self.population.corporate(corp_id)?;
        let mut weakest: Option<(AgentId, f64)> = None;
        for &worker in &corp.employees {
            let Some(h) = self.population.household(worker) else {
                continue;
            };
            if weakest.is_none_or(|(_, p)| h.productivity < p) {
                weakest = Some((worker, h.productivity));
            }
        }
        weakest.map(|(id, _)| id)
    }

    /// Households run the same cross-border pass the government ran
    /// earlier in the tick; foreign agents move 5% slices of their
    /// currency in or out of the domestic portfolio.
    pub fn international_trade<R: Rng>(&mut self, rng: &mut R) {
        self.government.household_trade(&mut self.population, rng);

        let exchange_rate = self.government.exchange_rate;
        let prices = &self.commodity_prices;
        let invest_split = &self.draws.invest_split;
        self.population.for_each_foreign_mut(|f| {
            if rng.random::<f64>() < 0.2 {
                let amount = f.foreign_currency * 0.05;
                if rng.random::<f64>() < 0.5 {
                    f.foreign_currency -= amount;
                    let domestic = amount * exchange_rate;
                    f.domestic_currency += domestic;
                    let split: [f64; 3] = invest_split.sample(rng);
                    f.portfolio.stocks += domestic * split[0];
                    f.portfolio.bonds += domestic * split[1];
                    let sleeve = domestic * split[2];
                    for commodity in Commodity::all() {
                        if let Some(&price) = prices.get(&commodity) {
                            *f.portfolio.commodities.entry(commodity).or_insert(0.0) +=
                                sleeve / 3.0 / price;
                        }
                    }
                } else {
                    let released = f.portfolio.divest(amount * exchange_rate);
                    f.domestic_currency -= released;
                    f.foreign_currency += released / exchange_rate;
                }
            }
        });
    }

    /// One-unit stock and bond trades per household, each asset drawn
    /// independently: buy when affordable, sell when held.
    pub fn financial_markets<R: Rng>(&mut self, market: &dyn AssetPriceSource, rng: &mut R) {
        let stock_price = market.average_price(AssetKind::Stock);
        let bond_price = market.average_price(AssetKind::Bond);

        self.population.for_each_household_mut(|h| {
            if rng.random::<f64>() < 0.1 {
                if rng.random::<f64>() < 0.5 {
                    if h.money > stock_price {
                        h.stocks += 1.0;
                        h.money -= stock_price;
                    }
                } else if h.stocks > 0.0 {
                    h.stocks -= 1.0;
                    h.money += stock_price;
                }
            }
            if rng.random::<f64>() < 0.1 {
                if rng.random::<f64>() < 0.5 {
                    if h.money > bond_price {
                        h.bonds += 1.0;
                        h.money -= bond_price;
                    }
                } else if h.bonds > 0.0 {
                    h.bonds -= 1.0;
                    h.money += bond_price;
                }
            }
        });
    }

    /// Multiplicative Gaussian shock per commodity, in `Commodity::all()`
    /// order.
    pub fn update_commodity_prices<R: Rng>(&mut self, rng: &mut R) {
        let noise = &self.draws.price_noise;
        for commodity in Commodity::all() {
            if let Some(price) = self.commodity_prices.get_mut(&commodity) {
                *price *= 1.0 + noise.sample(rng);
            }
        }
    }

    pub fn commodity_price(&self, commodity: Commodity) -> Money {
        self.commodity_prices.get(&commodity).copied().unwrap_or(0.0)
    }

    // === Checkpointing ===

    /// Serialize the whole run state (population, engines, prices, tick).
    /// RNG state is not captured; a restored run continues with whatever
    /// RNG the caller supplies.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn initial_commodity_prices() -> HashMap<Commodity, Money> {
    Commodity::all()
        .iter()
        .map(|&c| (c, c.initial_price()))
        .collect()
}
