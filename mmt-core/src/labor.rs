//! Labor market engine.
//!
//! Ten sub-steps per tick: participation draws, opening counts,
//! automation drift, sector-by-sector matching, the gig carve-out, sticky
//! sector wages, unemployment duration, tapered benefits (funded through
//! the government's money-creation capability), education, and union
//! membership. Sector wages move as an EMA against average productivity;
//! household wage expectations ratchet upward only, so the matching
//! filter tightens over time.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agents::{Employment, Household};
use crate::government::MoneyIssuer;
use crate::population::Population;
use crate::types::{AgentId, Money, Sector};

/// Ticks of unemployment over which benefits taper to zero.
pub const BENEFIT_TAPER_TICKS: u32 = 52;
/// Wage fraction gig work pays relative to the base wage.
pub const GIG_WAGE_FRACTION: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborConfig {
    pub base_wage: Money,
    pub skill_premium_factor: f64,
    pub unemployment_benefits: Money,
    pub job_search_cost: Money,
    pub labor_force_participation_rate: f64,
    pub wage_stickiness: f64,
    pub sectors: Vec<Sector>,
    pub education_cost: Money,
    pub education_time: u32,
    pub automation_rate: f64,
    pub gig_economy_share: f64,
    pub union_strength: f64,
}

impl Default for LaborConfig {
    fn default() -> Self {
        Self {
            base_wage: 20.0,
            skill_premium_factor: 1.5,
            unemployment_benefits: 10.0,
            job_search_cost: 5.0,
            labor_force_participation_rate: 0.7,
            wage_stickiness: 0.8,
            sectors: Sector::all().to_vec(),
            education_cost: 100.0,
            education_time: 4,
            automation_rate: 0.01,
            gig_economy_share: 0.1,
            union_strength: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborMarket {
    pub config: LaborConfig,
    /// Current wage per sector, EMA-updated each tick.
    pub sector_wages: HashMap<Sector, Money>,
    /// Openings per sector as of the last `update_openings` pass.
    pub job_openings: HashMap<Sector, u32>,
}

impl LaborMarket {
    pub fn new(config: LaborConfig) -> Self {
        let sector_wages = config.sectors.iter().map(|&s| (s, config.base_wage)).collect();
        let job_openings = config.sectors.iter().map(|&s| (s, 0)).collect();
        Self {
            config,
            sector_wages,
            job_openings,
        }
    }

    /// One full labor market tick. `issuer` funds benefit payments.
    pub fn step<R: Rng>(
        &mut self,
        tick: u64,
        population: &mut Population,
        issuer: &mut dyn MoneyIssuer,
        rng: &mut R,
    ) {
        // 1. PARTICIPATION DRAWS
        self.update_participation(population, rng);
        // 2. OPENING COUNTS
        self.update_openings(population);
        // 3. AUTOMATION DRIFT
        self.update_automation(population, rng);
        // 4. MATCHING
        self.match_jobs(population, rng);
        // 5. GIG CARVE-OUT
        self.gig_economy(population, rng);
        // 6. STICKY WAGES
        self.calculate_wages(population);
        // 7. UNEMPLOYMENT CLOCKS
        self.update_durations(population);
        // 8. TAPERED BENEFITS
        self.pay_benefits(population, issuer);
        // 9. EDUCATION
        self.handle_education(population, rng);
        // 10. UNION MEMBERSHIP
        self.update_unions(population, rng);

        #[cfg(feature = "telemetry")]
        {
            let log = self.dense_log(population);
            tracing::info!(
                target: "labor",
                tick,
                unemployment_rate = log.unemployment_rate,
                labor_force_participation_rate = log.labor_force_participation_rate,
                average_wage = log.average_wage,
                wage_manufacturing = self.sector_wage(Sector::Manufacturing),
                wage_services = self.sector_wage(Sector::Services),
                wage_technology = self.sector_wage(Sector::Technology),
                openings_manufacturing = self.sector_openings(Sector::Manufacturing),
                openings_services = self.sector_openings(Sector::Services),
                openings_technology = self.sector_openings(Sector::Technology),
                gig_economy_size = log.gig_economy_size,
                automation_level = log.automation_level,
                union_membership_rate = log.union_membership_rate,
            );
        }
        #[cfg(not(feature = "telemetry"))]
        let _ = tick;
    }

    /// Each household draws against the participation rate (halved for
    /// students). Failures stop searching and are detached from any
    /// employment, both sides of the relation cleared.
    pub fn update_participation<R: Rng>(&self, population: &mut Population, rng: &mut R) {
        let ids = population.household_ids().to_vec();
        for id in ids {
            let probability = {
                let Some(h) = population.household(id) else { continue };
                let mut p = self.config.labor_force_participation_rate;
                if h.education_progress > 0 {
                    p *= 0.5;
                }
                p
            };
            if rng.random::<f64>() < probability {
                if let Some(h) = population.household_mut(id) {
                    h.job_search_active = true;
                }
            } else {
                if let Some(h) = population.household_mut(id) {
                    h.job_search_active = false;
                }
                population.detach(id);
            }
        }
    }

    /// Per-sector opening totals from corporate headroom, discounted by
    /// each corporate's automation level.
    pub fn update_openings(&mut self, population: &Population) {
        self.job_openings = self.config.sectors.iter().map(|&s| (s, 0)).collect();
        for corp in population.corporates() {
            if let Some(count) = self.job_openings.get_mut(&corp.sector) {
                *count += corp.effective_openings();
            }
        }
    }

    /// Each corporate independently drifts +0.1 automation with
    /// probability automation_rate, capped at full automation.
    pub fn update_automation<R: Rng>(&self, population: &mut Population, rng: &mut R) {
        let rate = self.config.automation_rate;
        population.for_each_corporate_mut(|c| {
            if rng.random::<f64>() < rate {
                c.automation_level = (c.automation_level + 0.1).min(1.0);
            }
        });
    }

    /// Match active unemployed households against sector openings. One
    /// shared pool; per sector, applicants are pool members whose wage
    /// expectation the sector wage meets, and a uniform random subset of
    /// them (capped by openings) is hired onto the least-loaded corporate
    /// in that sector. Whoever is still in the pool afterwards pays the
    /// search cost.
    pub fn match_jobs<R: Rng>(&mut self, population: &mut Population, rng: &mut R) {
        let mut pool: Vec<AgentId> = population
            .household_ids()
            .iter()
            .copied()
            .filter(|&id| {
                population
                    .household(id)
                    .is_some_and(|h| h.employment == Employment::Unemployed && h.job_search_active)
            })
            .collect();

        let sectors = self.config.sectors.clone();
        for sector in sectors {
            let openings = self.sector_openings(sector) as usize;
            let wage = self.sector_wage(sector);

            let applicants: Vec<AgentId> = pool
                .iter()
                .copied()
                .filter(|&id| {
                    population
                        .household(id)
                        .is_some_and(|h| h.wage_expectation <= wage)
                })
                .collect();
            let matches = openings.min(applicants.len());
            if matches == 0 {
                continue;
            }

            for index in rand::seq::index::sample(rng, applicants.len(), matches) {
                let worker = applicants[index];
                let Some(employer) = self.least_loaded_employer(population, sector) else {
                    break;
                };
                population.hire(employer, worker);
                pool.retain(|&id| id != worker);
            }
        }

        let cost = self.config.job_search_cost;
        for id in pool {
            if let Some(h) = population.household_mut(id) {
                h.money -= cost;
            }
        }
    }

    /// Corporate in `sector` with the fewest employees; ties resolve to
    /// the earliest-registered one, so placement is deterministic given
    /// the match draw.
    fn least_loaded_employer(&self, population: &Population, sector: Sector) -> Option<AgentId> {
        population
            .corporate_ids()
            .iter()
            .copied()
            .filter(|&id| population.corporate(id).is_some_and(|c| c.sector == sector))
            .min_by_key(|&id| population.corporate(id).map_or(usize::MAX, |c| c.headcount()))
    }

    /// A random slice of the still-unemployed (search-active or not)
    /// takes part-time gig work at 0.7 of base wage. Sized as a share of
    /// the whole population, clamped to the available pool.
    pub fn gig_economy<R: Rng>(&self, population: &mut Population, rng: &mut R) {
        let pool: Vec<AgentId> = population
            .household_ids()
            .iter()
            .copied()
            .filter(|&id| {
                population
                    .household(id)
                    .is_some_and(|h| h.employment == Employment::Unemployed)
            })
            .collect();
        let target =
            (population.household_count() as f64 * self.config.gig_economy_share) as usize;
        let count = target.min(pool.len());
        if count == 0 {
            return;
        }

        let wage = self.config.base_wage * GIG_WAGE_FRACTION;
        for index in rand::seq::index::sample(rng, pool.len(), count) {
            if let Some(h) = population.household_mut(pool[index]) {
                h.gig_worker = true;
                h.employment = Employment::Gig;
                h.income = wage;
            }
        }
    }

    /// EMA each sector wage toward base_wage scaled by that sector's
    /// average productivity (sectors with no workers keep their wage),
    /// then re-price every employed household's income off its sector
    /// wage. Gig incomes were fixed by the carve-out and stay put.
    pub fn calculate_wages(&mut self, population: &mut Population) {
        for i in 0..self.config.sectors.len() {
            let sector = self.config.sectors[i];
            let mut sum = 0.0;
            let mut count = 0usize;
            for h in population.households() {
                if h.sector == Some(sector) {
                    sum += h.productivity;
                    count += 1;
                }
            }
            if count == 0 {
                continue;
            }
            let avg_productivity = sum / count as f64;
            let new_wage = self.config.base_wage
                * (1.0 + avg_productivity * self.config.skill_premium_factor);
            if let Some(wage) = self.sector_wages.get_mut(&sector) {
                *wage = self.config.wage_stickiness * *wage
                    + (1.0 - self.config.wage_stickiness) * new_wage;
            }
        }

        population.for_each_household_mut(|h| {
            if h.employment != Employment::Employed {
                return;
            }
            let wage = self.wage_for(h);
            h.income = wage;
            h.wage_expectation = h.wage_expectation.max(wage);
        });
    }

    /// Market wage for one household as currently classified: gig work
    /// pays the gig fraction of base, employment pays the sector wage
    /// scaled by skill plus the union boost. Base wage stands in when no
    /// sector is set.
    pub fn wage_for(&self, household: &Household) -> Money {
        if household.employment == Employment::Gig {
            return self.config.base_wage * GIG_WAGE_FRACTION;
        }
        let sector_wage = household
            .sector
            .and_then(|s| self.sector_wages.get(&s).copied())
            .unwrap_or(self.config.base_wage);
        let mut wage = sector_wage * (1.0 + household.skill_level * self.config.skill_premium_factor);
        if household.union_member {
            wage *= 1.0 + self.config.union_strength * 0.2;
        }
        wage
    }

    /// Unemployment clocks tick up for active searchers and reset for
    /// everyone else.
    pub fn update_durations(&self, population: &mut Population) {
        population.for_each_household_mut(|h| {
            if h.employment == Employment::Unemployed && h.job_search_active {
                h.unemployed_duration += 1;
            } else {
                h.unemployed_duration = 0;
            }
        });
    }

    /// Active unemployed receive benefits tapering linearly to zero over
    /// [`BENEFIT_TAPER_TICKS`]; every payment is freshly issued money.
    pub fn pay_benefits(&self, population: &mut Population, issuer: &mut dyn MoneyIssuer) {
        let base = self.config.unemployment_benefits;
        population.for_each_household_mut(|h| {
            if h.employment == Employment::Unemployed && h.job_search_active {
                let taper = 1.0 - h.unemployed_duration as f64 / BENEFIT_TAPER_TICKS as f64;
                let benefit = base * taper.max(0.0);
                h.money += benefit;
                issuer.create_money(benefit);
            }
        });
    }

    /// Students advance one step per tick and graduate at
    /// education_time: +1 level, +0.2 skill capped at 1. Everyone else
    /// who can afford tuition enrolls with probability 0.1.
    pub fn handle_education<R: Rng>(&self, population: &mut Population, rng: &mut R) {
        let cost = self.config.education_cost;
        let time = self.config.education_time;
        population.for_each_household_mut(|h| {
            if h.education_progress > 0 {
                h.education_progress += 1;
                if h.education_progress >= time {
                    h.education_level += 1;
                    h.education_progress = 0;
                    h.skill_level = (h.skill_level + 0.2).min(1.0);
                }
            } else if h.money > cost && rng.random::<f64>() < 0.1 {
                h.money -= cost;
                h.education_progress = 1;
            }
        });
    }

    /// Employed non-members join with probability union_strength x 0.1.
    /// Membership never lapses.
    pub fn update_unions<R: Rng>(&self, population: &mut Population, rng: &mut R) {
        let join_probability = self.config.union_strength * 0.1;
        population.for_each_household_mut(|h| {
            if h.employment == Employment::Employed
                && !h.union_member
                && rng.random::<f64>() < join_probability
            {
                h.union_member = true;
            }
        });
    }

    // === Aggregate queries ===

    pub fn sector_wage(&self, sector: Sector) -> Money {
        self.sector_wages
            .get(&sector)
            .copied()
            .unwrap_or(self.config.base_wage)
    }

    pub fn sector_openings(&self, sector: Sector) -> u32 {
        self.job_openings.get(&sector).copied().unwrap_or(0)
    }

    /// Unemployed share of the active labor force. 0 when nobody is
    /// searching.
    pub fn unemployment_rate(&self, population: &Population) -> f64 {
        let active = population.households().filter(|h| h.job_search_active).count();
        if active == 0 {
            return 0.0;
        }
        let unemployed = population
            .households()
            .filter(|h| h.job_search_active && h.employment == Employment::Unemployed)
            .count();
        unemployed as f64 / active as f64
    }

    pub fn participation_rate(&self, population: &Population) -> f64 {
        let total = population.household_count();
        if total == 0 {
            return 0.0;
        }
        let active = population.households().filter(|h| h.job_search_active).count();
        active as f64 / total as f64
    }

    /// Mean income over working (employed or gig) households.
    pub fn average_wage(&self, population: &Population) -> Money {
        let mut sum = 0.0;
        let mut count = 0usize;
        for h in population.households() {
            if h.employment.is_working() {
                sum += h.income;
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { sum / count as f64 }
    }

    pub fn gig_economy_size(&self, population: &Population) -> f64 {
        let total = population.household_count();
        if total == 0 {
            return 0.0;
        }
        population.households().filter(|h| h.gig_worker).count() as f64 / total as f64
    }

    pub fn automation_level(&self, population: &Population) -> f64 {
        let count = population.corporate_count();
        if count == 0 {
            return 0.0;
        }
        population.corporates().map(|c| c.automation_level).sum::<f64>() / count as f64
    }

    pub fn union_membership_rate(&self, population: &Population) -> f64 {
        let total = population.household_count();
        if total == 0 {
            return 0.0;
        }
        population.households().filter(|h| h.union_member).count() as f64 / total as f64
    }

    /// Flat per-tick snapshot of the market's published state.
    pub fn dense_log(&self, population: &Population) -> LaborLog {
        LaborLog {
            unemployment_rate: self.unemployment_rate(population),
            labor_force_participation_rate: self.participation_rate(population),
            average_wage: self.average_wage(population),
            sector_wages: self.sector_wages.clone(),
            job_openings: self.job_openings.clone(),
            gig_economy_size: self.gig_economy_size(population),
            automation_level: self.automation_level(population),
            union_membership_rate: self.union_membership_rate(population),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborLog {
    pub unemployment_rate: f64,
    pub labor_force_participation_rate: f64,
    pub average_wage: Money,
    pub sector_wages: HashMap<Sector, Money>,
    pub job_openings: HashMap<Sector, u32>,
    pub gig_economy_size: f64,
    pub automation_level: f64,
    pub union_membership_rate: f64,
}
