//! Government fiscal-monetary engine.
//!
//! Runs twelve sub-steps per tick in a fixed order: productivity growth,
//! indicator computation, functional-finance spending, progressive
//! taxation, the job guarantee, interest and exchange rate management,
//! budget distribution, private-sector compounding, banking, household
//! foreign trade, and expectation formation. Spending is driven by macro
//! targets rather than a balanced budget: money is created against the
//! unemployment gap and withdrawn (retiring debt one-for-one) through
//! taxation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agents::Employment;
use crate::population::Population;
use crate::types::{Money, Rate};

/// Foreign exchange war chest at engine construction.
pub const INITIAL_FX_RESERVES: Money = 1_000_000.0;
/// Fraction of deposits banks hold back from the loanable pool.
pub const RESERVE_REQUIREMENT: f64 = 0.1;
/// Hard bounds on the policy rate.
pub const INTEREST_RATE_FLOOR: Rate = 0.001;
pub const INTEREST_RATE_CEILING: Rate = 0.1;

/// Narrow money-creation capability handed to other engines so they can
/// fund transfers without reaching into government internals.
pub trait MoneyIssuer {
    fn create_money(&mut self, amount: Money);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernmentConfig {
    pub unemployment_target: Rate,
    pub inflation_target: Rate,
    pub initial_money_supply: Money,
    pub spending_multiplier: f64,
    pub base_tax_rate: Rate,
    /// Ascending (threshold, marginal rate) pairs.
    pub tax_brackets: Vec<(Money, Rate)>,
    pub job_guarantee_wage: Money,
    pub interest_rate: Rate,
    pub productivity_growth_rate: Rate,
    pub exchange_rate: f64,
}

impl Default for GovernmentConfig {
    fn default() -> Self {
        Self {
            unemployment_target: 0.04,
            inflation_target: 0.02,
            initial_money_supply: 1_000_000.0,
            spending_multiplier: 1.5,
            base_tax_rate: 0.3,
            tax_brackets: vec![
                (50_000.0, 0.2),
                (100_000.0, 0.3),
                (250_000.0, 0.4),
                (500_000.0, 0.5),
            ],
            job_guarantee_wage: 10.0,
            interest_rate: 0.02,
            productivity_growth_rate: 0.02,
            exchange_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Government {
    pub config: GovernmentConfig,

    // === Fiscal/monetary stocks ===
    pub money_supply: Money,
    pub govt_budget: Money,
    pub govt_debt: Money,
    pub collected_taxes: Money,
    pub job_guarantee_spending: Money,
    pub interest_rate: Rate,
    pub exchange_rate: f64,
    pub foreign_exchange_reserves: Money,
    pub inflation_expectations: Rate,
    pub bank_reserves: Money,
    pub private_sector_savings: Money,

    // === Indicators, recomputed each tick and published to the planner ===
    pub unemployment_rate: Rate,
    pub inflation_rate: Rate,
    pub gdp: Money,
    pub gini_coefficient: f64,
    pub govt_debt_to_gdp: f64,
    pub private_savings_to_gdp: f64,
    pub productivity_index: f64,
    pub trade_balance: Money,
}

impl Government {
    pub fn new(mut config: GovernmentConfig) -> Self {
        config
            .tax_brackets
            .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            money_supply: config.initial_money_supply,
            govt_budget: 0.0,
            govt_debt: 0.0,
            collected_taxes: 0.0,
            job_guarantee_spending: 0.0,
            interest_rate: config.interest_rate,
            exchange_rate: config.exchange_rate,
            foreign_exchange_reserves: INITIAL_FX_RESERVES,
            inflation_expectations: config.inflation_target,
            bank_reserves: 0.0,
            private_sector_savings: 0.0,
            unemployment_rate: 0.0,
            inflation_rate: 0.0,
            gdp: 0.0,
            gini_coefficient: 0.0,
            govt_debt_to_gdp: 0.0,
            private_savings_to_gdp: 0.0,
            productivity_index: 0.0,
            trade_balance: 0.0,
            config,
        }
    }

    /// One full government tick.
    pub fn step<R: Rng>(&mut self, tick: u64, population: &mut Population, rng: &mut R) {
        // 1. PRODUCTIVITY GROWTH
        self.update_productivity(population);
        // 2. MACRO INDICATORS
        self.calculate_indicators(population);
        // 3. FUNCTIONAL FINANCE SPENDING
        self.functional_finance();
        // 4. PROGRESSIVE TAXATION
        self.collect_taxes(population);
        // 5. JOB GUARANTEE
        self.job_guarantee(population);
        // 6. INTEREST RATE POLICY
        self.manage_interest();
        // 7. EXCHANGE RATE POLICY
        self.manage_exchange_rate();
        // 8. BUDGET DISTRIBUTION
        self.distribute_budget(population);
        // 9. PRIVATE SECTOR COMPOUNDING
        self.update_private_finances(population);
        // 10. BANKING
        self.update_banking(population);
        // 11. FOREIGN TRADE
        self.household_trade(population, rng);
        // 12. EXPECTATION FORMATION
        self.update_expectations(population);

        #[cfg(feature = "telemetry")]
        tracing::info!(
            target: "government",
            tick,
            unemployment_rate = self.unemployment_rate,
            inflation_rate = self.inflation_rate,
            gdp = self.gdp,
            gini_coefficient = self.gini_coefficient,
            money_supply = self.money_supply,
            govt_budget = self.govt_budget,
            collected_taxes = self.collected_taxes,
            job_guarantee_spending = self.job_guarantee_spending,
            govt_debt = self.govt_debt,
            govt_debt_to_gdp = self.govt_debt_to_gdp,
            private_savings_to_gdp = self.private_savings_to_gdp,
            interest_rate = self.interest_rate,
            productivity_index = self.productivity_index,
            trade_balance = self.trade_balance,
            exchange_rate = self.exchange_rate,
            inflation_expectations = self.inflation_expectations,
            bank_reserves = self.bank_reserves,
            foreign_exchange_reserves = self.foreign_exchange_reserves,
        );
        #[cfg(not(feature = "telemetry"))]
        let _ = tick;
    }

    /// Every household's productivity compounds by the growth rate.
    pub fn update_productivity(&self, population: &mut Population) {
        let growth = 1.0 + self.config.productivity_growth_rate;
        population.for_each_household_mut(|h| h.productivity *= growth);
    }

    /// Recompute the eight macro indicators and publish them to the
    /// planner sink. Money supply resets to the measured total, so the
    /// inflation rate is the supply growth since the previous tick.
    pub fn calculate_indicators(&mut self, population: &mut Population) {
        let total = population.household_count();
        let working = population
            .households()
            .filter(|h| h.employment.is_working())
            .count();
        self.unemployment_rate = if total == 0 {
            0.0
        } else {
            1.0 - working as f64 / total as f64
        };

        let total_money: Money =
            population.households().map(|h| h.money).sum::<f64>() + self.govt_budget;
        self.inflation_rate = if self.money_supply != 0.0 {
            (total_money - self.money_supply) / self.money_supply
        } else {
            0.0
        };
        self.money_supply = total_money;

        self.gdp = population.households().map(|h| h.income).sum();
        let incomes: Vec<Money> = population.households().map(|h| h.income).collect();
        self.gini_coefficient = gini_coefficient(&incomes);

        self.govt_debt_to_gdp = if self.gdp > 0.0 {
            self.govt_debt / self.gdp
        } else {
            0.0
        };
        self.private_savings_to_gdp = if self.gdp > 0.0 {
            self.private_sector_savings / self.gdp
        } else {
            0.0
        };
        self.productivity_index = if total == 0 {
            0.0
        } else {
            population.households().map(|h| h.productivity).sum::<f64>() / total as f64
        };
        self.trade_balance =
            population.households().map(|h| h.foreign_currency).sum::<f64>() * self.exchange_rate;

        let planner = &mut population.planner;
        planner.unemployment_rate = self.unemployment_rate;
        planner.inflation_rate = self.inflation_rate;
        planner.gdp = self.gdp;
        planner.gini_coefficient = self.gini_coefficient;
        planner.govt_debt_to_gdp = self.govt_debt_to_gdp;
        planner.private_savings_to_gdp = self.private_savings_to_gdp;
        planner.productivity_index = self.productivity_index;
        planner.trade_balance = self.trade_balance;
    }

    /// Spending responds to the unemployment and inflation gaps, debt
    /// load, productivity drift, and the trade balance; capped at half
    /// of GDP and issued as new money.
    pub fn functional_finance(&mut self) {
        let unemployment_gap = self.unemployment_rate - self.config.unemployment_target;
        let inflation_gap = self.inflation_rate - self.config.inflation_target;
        let productivity_adjustment = (self.config.productivity_growth_rate - 0.02) * 0.5;
        let trade_adjustment = if self.gdp > 0.0 {
            -self.trade_balance / self.gdp * 0.1
        } else {
            0.0
        };

        let adjustment = unemployment_gap * 2.0 - inflation_gap * 1.5
            + self.govt_debt_to_gdp * 0.1
            + productivity_adjustment
            + trade_adjustment;
        let spending =
            (self.gdp * self.config.spending_multiplier * (1.0 + adjustment)).min(self.gdp * 0.5);

        self.create_money(spending);
    }

    /// The only money-creation path: budget, supply, and debt move
    /// together by exactly `amount`.
    pub fn create_money(&mut self, amount: Money) {
        self.govt_budget += amount;
        self.money_supply += amount;
        self.govt_debt += amount;
    }

    /// Bracketed marginal tax: each band of income up to a threshold is
    /// taxed at that threshold's rate, the remainder above the last
    /// crossed threshold at the base rate. Never negative.
    pub fn progressive_tax(&self, income: Money) -> Money {
        let mut tax = 0.0;
        let mut previous_threshold = 0.0;
        for &(threshold, rate) in &self.config.tax_brackets {
            if income > threshold {
                tax += (income.min(threshold) - previous_threshold) * rate;
                previous_threshold = threshold;
            } else {
                break;
            }
        }
        tax += (income - previous_threshold) * self.config.base_tax_rate;
        tax.max(0.0)
    }

    /// Tax every household on income; the collected total leaves
    /// circulation and retires debt one-for-one.
    pub fn collect_taxes(&mut self, population: &mut Population) {
        let mut collected = 0.0;
        population.for_each_household_mut(|h| {
            let tax = self.progressive_tax(h.income);
            h.money -= tax;
            collected += tax;
        });
        self.collected_taxes = collected;
        self.money_supply -= collected;
        self.govt_debt -= collected;
    }

    /// Pay every unemployed household the guarantee wage, flag them as
    /// participants, and fund the total with new money.
    pub fn job_guarantee(&mut self, population: &mut Population) {
        let wage = self.config.job_guarantee_wage;
        let mut spending = 0.0;
        population.for_each_household_mut(|h| {
            if h.employment == Employment::Unemployed {
                h.job_guarantee_participant = true;
                h.money += wage;
                spending += wage;
            } else {
                h.job_guarantee_participant = false;
            }
        });
        self.job_guarantee_spending = spending;
        self.create_money(spending);
    }

    /// Two independent rule layers nudge the rate: ±0.001 on the
    /// inflation/unemployment gap pair, ±0.002 when expectations drift
    /// more than a point past target. Debt then compounds at the rate.
    pub fn manage_interest(&mut self) {
        let inflation_target = self.config.inflation_target;
        let unemployment_target = self.config.unemployment_target;

        if self.inflation_rate > inflation_target && self.unemployment_rate < unemployment_target {
            self.interest_rate = (self.interest_rate + 0.001).min(INTEREST_RATE_CEILING);
        } else if self.inflation_rate < inflation_target
            && self.unemployment_rate > unemployment_target
        {
            self.interest_rate = (self.interest_rate - 0.001).max(INTEREST_RATE_FLOOR);
        }

        if self.inflation_expectations > inflation_target + 0.01 {
            self.interest_rate = (self.interest_rate + 0.002).min(INTEREST_RATE_CEILING);
        } else if self.inflation_expectations < inflation_target - 0.01 {
            self.interest_rate = (self.interest_rate - 0.002).max(INTEREST_RATE_FLOOR);
        }

        self.govt_debt *= 1.0 + self.interest_rate;
    }

    /// Trade-balance pressure and the rate differential move the
    /// exchange rate; outside [0.8, 1.2] reserves fund a partial
    /// intervention back toward parity.
    pub fn manage_exchange_rate(&mut self) {
        let pressure = if self.gdp > 0.0 {
            self.trade_balance / self.gdp
        } else {
            0.0
        };
        let differential = self.interest_rate - 0.02;
        self.exchange_rate *= 1.0 + pressure * 0.1 + differential * 0.2;

        if self.exchange_rate < 0.8 || self.exchange_rate > 1.2 {
            let intervention = (1.0 - self.exchange_rate) * self.foreign_exchange_reserves * 0.1;
            self.foreign_exchange_reserves -= intervention;
            if self.foreign_exchange_reserves != 0.0 {
                self.exchange_rate += intervention / self.foreign_exchange_reserves;
            }
        }
    }

    /// Whatever budget remains after the guarantee is split evenly
    /// across households; the budget always ends the tick at zero.
    pub fn distribute_budget(&mut self, population: &mut Population) {
        let count = population.household_count();
        if count > 0 {
            let share = (self.govt_budget - self.job_guarantee_spending) / count as f64;
            population.for_each_household_mut(|h| h.money += share);
        }
        self.govt_budget = 0.0;
    }

    /// Savings earn the policy rate, debt costs 1.5x it.
    pub fn update_private_finances(&mut self, population: &mut Population) {
        let rate = self.interest_rate;
        let mut savings_total = 0.0;
        population.for_each_household_mut(|h| {
            h.savings *= 1.0 + rate;
            h.debt *= 1.0 + rate * 1.5;
            savings_total += h.savings;
        });
        self.private_sector_savings = savings_total;
    }

    /// Deposits back a loanable pool (net of reserves); small loans go
    /// to under-leveraged households in population order, draining the
    /// pool as they are issued.
    pub fn update_banking(&mut self, population: &mut Population) {
        let deposits: Money = population.households().map(|h| h.savings).sum();
        self.bank_reserves = deposits * RESERVE_REQUIREMENT;
        let mut loanable = deposits - self.bank_reserves;

        population.for_each_household_mut(|h| {
            if h.debt < h.income * 2.0 {
                let loan = (loanable * 0.01).min(h.income);
                h.money += loan;
                h.debt += loan;
                loanable -= loan;
            }
        });
    }

    /// Each household trades abroad with 10% probability: a tenth of
    /// its money moves, export and import equally likely.
    pub fn household_trade<R: Rng>(&self, population: &mut Population, rng: &mut R) {
        let rate = self.exchange_rate;
        population.for_each_household_mut(|h| {
            if rng.random::<f64>() < 0.1 {
                let amount = h.money * 0.1;
                if rng.random::<f64>() < 0.5 {
                    h.money += amount;
                    h.foreign_currency += amount / rate;
                } else {
                    h.money -= amount;
                    h.foreign_currency -= amount / rate;
                }
            }
        });
    }

    /// Households EMA their expectation toward realized inflation; the
    /// engine aggregate is the population mean.
    pub fn update_expectations(&mut self, population: &mut Population) {
        let inflation = self.inflation_rate;
        let mut sum = 0.0;
        let mut count = 0usize;
        population.for_each_household_mut(|h| {
            h.inflation_expectation = h.inflation_expectation * 0.9 + inflation * 0.1;
            sum += h.inflation_expectation;
            count += 1;
        });
        if count > 0 {
            self.inflation_expectations = sum / count as f64;
        }
    }

    /// Flat per-tick snapshot of everything the engine publishes.
    pub fn dense_log(&self) -> GovernmentLog {
        GovernmentLog {
            unemployment_rate: self.unemployment_rate,
            inflation_rate: self.inflation_rate,
            gdp: self.gdp,
            gini_coefficient: self.gini_coefficient,
            money_supply: self.money_supply,
            govt_budget: self.govt_budget,
            collected_taxes: self.collected_taxes,
            job_guarantee_spending: self.job_guarantee_spending,
            govt_debt: self.govt_debt,
            govt_debt_to_gdp: self.govt_debt_to_gdp,
            private_savings_to_gdp: self.private_savings_to_gdp,
            interest_rate: self.interest_rate,
            productivity_index: self.productivity_index,
            trade_balance: self.trade_balance,
            exchange_rate: self.exchange_rate,
            inflation_expectations: self.inflation_expectations,
            bank_reserves: self.bank_reserves,
            foreign_exchange_reserves: self.foreign_exchange_reserves,
        }
    }
}

impl MoneyIssuer for Government {
    fn create_money(&mut self, amount: Money) {
        Government::create_money(self, amount);
    }
}

/// Gini coefficient over an income slice via the cumulative Lorenz
/// form: sort ascending, compare running totals against the equality
/// line i·total/n. Equal incomes score 0; a lone earner approaches 1.
/// All-zero incomes divide 0/0 and return NaN; the first post-reset
/// tick does exactly that.
pub fn gini_coefficient(incomes: &[Money]) -> f64 {
    let mut sorted = incomes.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    let mut cumulative = 0.0;
    let mut lorenz_gap = 0.0;
    let mut cumulative_total = 0.0;
    for (i, income) in sorted.iter().enumerate() {
        cumulative += income;
        let equality = (i as f64 + 1.0) * total / n;
        lorenz_gap += equality - cumulative;
        cumulative_total += cumulative;
    }
    lorenz_gap / cumulative_total
}

/// Log field inventory mirrors the tracing event in [`Government::step`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernmentLog {
    pub unemployment_rate: Rate,
    pub inflation_rate: Rate,
    pub gdp: Money,
    pub gini_coefficient: f64,
    pub money_supply: Money,
    pub govt_budget: Money,
    pub collected_taxes: Money,
    pub job_guarantee_spending: Money,
    pub govt_debt: Money,
    pub govt_debt_to_gdp: f64,
    pub private_savings_to_gdp: f64,
    pub interest_rate: Rate,
    pub productivity_index: f64,
    pub trade_balance: Money,
    pub exchange_rate: f64,
    pub inflation_expectations: Rate,
    pub bank_reserves: Money,
    pub foreign_exchange_reserves: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Household;

    fn pop_with_incomes(incomes: &[Money]) -> Population {
        let mut pop = Population::new();
        for &income in incomes {
            pop.add_household(Household::new().with_income(income));
        }
        pop
    }

    #[test]
    fn progressive_tax_matches_bracket_table() {
        let government = Government::new(GovernmentConfig {
            tax_brackets: vec![(50_000.0, 0.2), (100_000.0, 0.3)],
            base_tax_rate: 0.3,
            ..GovernmentConfig::default()
        });

        // 50k at 20% plus 25k above the crossed bracket at the base rate
        assert_eq!(government.progressive_tax(75_000.0), 17_500.0);
        assert_eq!(government.progressive_tax(0.0), 0.0);
        assert_eq!(government.progressive_tax(-5_000.0), 0.0);
    }

    #[test]
    fn progressive_tax_is_monotonic() {
        let government = Government::new(GovernmentConfig::default());
        let mut previous = 0.0;
        for income in (0..200).map(|i| i as f64 * 5_000.0) {
            let tax = government.progressive_tax(income);
            assert!(
                tax >= previous,
                "tax dropped from {previous:.2} to {tax:.2} at income {income:.0}"
            );
            previous = tax;
        }
    }

    #[test]
    fn create_money_moves_all_three_aggregates() {
        let mut government = Government::new(GovernmentConfig::default());
        let budget = government.govt_budget;
        let supply = government.money_supply;
        let debt = government.govt_debt;

        government.create_money(250.0);

        assert_eq!(government.govt_budget - budget, 250.0);
        assert_eq!(government.money_supply - supply, 250.0);
        assert_eq!(government.govt_debt - debt, 250.0);
    }

    #[test]
    fn taxation_retires_debt_one_for_one() {
        let mut government = Government::new(GovernmentConfig::default());
        let mut pop = pop_with_incomes(&[30_000.0, 60_000.0, 120_000.0]);
        government.govt_debt = 500_000.0;

        let supply = government.money_supply;
        let debt = government.govt_debt;
        government.collect_taxes(&mut pop);

        assert!(government.collected_taxes > 0.0);
        let collected = government.collected_taxes;
        assert!((supply - government.money_supply - collected).abs() < 1e-9);
        assert!((debt - government.govt_debt - collected).abs() < 1e-9);
    }

    #[test]
    fn job_guarantee_pays_every_unemployed_household() {
        let mut government = Government::new(GovernmentConfig::default());
        let mut pop = pop_with_incomes(&[0.0; 10]);

        let supply = government.money_supply;
        let debt = government.govt_debt;
        let budget = government.govt_budget;
        government.job_guarantee(&mut pop);

        let wage = government.config.job_guarantee_wage;
        assert_eq!(government.job_guarantee_spending, 10.0 * wage);
        for h in pop.households() {
            assert!(h.job_guarantee_participant);
            assert_eq!(h.money, 1000.0 + wage);
        }
        assert_eq!(government.money_supply - supply, 10.0 * wage);
        assert_eq!(government.govt_debt - debt, 10.0 * wage);
        assert_eq!(government.govt_budget - budget, 10.0 * wage);
    }

    #[test]
    fn working_households_lose_the_guarantee_flag() {
        let mut government = Government::new(GovernmentConfig::default());
        let mut pop = Population::new();
        let id = pop.add_household(Household::new().with_employment(Employment::Gig));
        pop.household_mut(id).unwrap().job_guarantee_participant = true;

        government.job_guarantee(&mut pop);

        assert!(!pop.household(id).unwrap().job_guarantee_participant);
        assert_eq!(government.job_guarantee_spending, 0.0);
    }

    #[test]
    fn interest_rate_never_leaves_its_clamp() {
        let mut government = Government::new(GovernmentConfig::default());

        // Persistent overheating pushes the rate to the ceiling, never past
        government.inflation_rate = 0.2;
        government.unemployment_rate = 0.0;
        government.inflation_expectations = 0.2;
        for _ in 0..200 {
            government.manage_interest();
            assert!(government.interest_rate <= INTEREST_RATE_CEILING);
            assert!(government.interest_rate >= INTEREST_RATE_FLOOR);
        }
        assert_eq!(government.interest_rate, INTEREST_RATE_CEILING);

        // Persistent slack drags it to the floor
        government.inflation_rate = -0.1;
        government.unemployment_rate = 0.5;
        government.inflation_expectations = -0.1;
        for _ in 0..200 {
            government.manage_interest();
            assert!(government.interest_rate >= INTEREST_RATE_FLOOR);
        }
        assert_eq!(government.interest_rate, INTEREST_RATE_FLOOR);
    }

    #[test]
    fn gini_of_equal_incomes_is_zero() {
        let g = gini_coefficient(&[25_000.0; 8]);
        assert!(g.abs() < 1e-12, "equal incomes must score 0, got {g}");
    }

    #[test]
    fn gini_of_lone_earner_is_one() {
        let g = gini_coefficient(&[0.0, 0.0, 100.0]);
        assert!((g - 1.0).abs() < 1e-12, "got {g}");
    }

    #[test]
    fn gini_of_uniform_spread() {
        let g = gini_coefficient(&[10.0, 20.0, 30.0, 40.0]);
        assert!((g - 0.25).abs() < 1e-12, "got {g}");
    }

    #[test]
    fn gini_of_all_zero_incomes_is_nan() {
        // Known unguarded edge: the cumulative total divides by zero
        assert!(gini_coefficient(&[0.0; 5]).is_nan());
    }

    #[test]
    fn budget_always_ends_distribution_at_zero() {
        let mut government = Government::new(GovernmentConfig::default());
        let mut pop = pop_with_incomes(&[10.0, 10.0]);
        government.create_money(1_000.0);
        government.job_guarantee_spending = 200.0;

        government.distribute_budget(&mut pop);

        assert_eq!(government.govt_budget, 0.0);
        // (1000 - 200) / 2 on top of the 1000 reset balance
        for h in pop.households() {
            assert_eq!(h.money, 1400.0);
        }
    }

    #[test]
    fn banking_drains_the_loanable_pool_in_order() {
        let mut government = Government::new(GovernmentConfig::default());
        let mut pop = Population::new();
        for _ in 0..3 {
            let id = pop.add_household(Household::new().with_income(50.0));
            pop.household_mut(id).unwrap().savings = 10_000.0;
        }

        government.update_banking(&mut pop);

        assert_eq!(government.bank_reserves, 3_000.0);
        // pool starts at 27_000; 1% offers shrink with each loan
        let loans: Vec<Money> = pop.households().map(|h| h.debt).collect();
        assert_eq!(loans, vec![50.0, 50.0, 50.0], "income caps each loan");

        // A leveraged household is skipped entirely
        let id = pop.add_household(Household::new().with_income(50.0));
        pop.household_mut(id).unwrap().debt = 200.0;
        government.update_banking(&mut pop);
        assert_eq!(pop.household(id).unwrap().debt, 200.0);
    }

    #[test]
    fn indicators_publish_to_the_planner() {
        let mut government = Government::new(GovernmentConfig::default());
        let mut pop = pop_with_incomes(&[10.0, 20.0, 30.0]);

        government.calculate_indicators(&mut pop);

        assert_eq!(pop.planner.gdp, 60.0);
        assert_eq!(pop.planner.unemployment_rate, 1.0);
        assert!((pop.planner.gini_coefficient - government.gini_coefficient).abs() < 1e-12);
    }

    #[test]
    fn expectations_converge_toward_realized_inflation() {
        let mut government = Government::new(GovernmentConfig::default());
        let mut pop = pop_with_incomes(&[0.0; 4]);
        government.inflation_rate = 0.05;

        for _ in 0..120 {
            government.update_expectations(&mut pop);
        }
        assert!((government.inflation_expectations - 0.05).abs() < 1e-6);
    }
}
