//! The shared agent population: one arena, typed accessors, and the
//! employer↔employee relation helpers.
//!
//! Engines never hold references into the arena across mutations; they
//! iterate the insertion-ordered id lists and look agents up per id, so
//! every per-tick loop is deterministic.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::agents::{Corporate, Employment, Foreign, Household};
use crate::types::{AgentId, Money, Rate};

/// Any agent in the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Agent {
    Household(Household),
    Corporate(Corporate),
    Foreign(Foreign),
}

/// Write-only sink for the macro indicators the government publishes
/// once per tick. No behavior of its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Planner {
    pub unemployment_rate: Rate,
    pub inflation_rate: Rate,
    pub gdp: Money,
    pub gini_coefficient: f64,
    pub govt_debt_to_gdp: f64,
    pub private_savings_to_gdp: f64,
    pub productivity_index: f64,
    pub trade_balance: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Population {
    agents: SlotMap<AgentId, Agent>,
    households: Vec<AgentId>,
    corporates: Vec<AgentId>,
    foreigns: Vec<AgentId>,
    pub planner: Planner,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    // === Agents ===

    pub fn add_household(&mut self, household: Household) -> AgentId {
        let id = self.agents.insert(Agent::Household(household));
        self.households.push(id);
        id
    }

    pub fn add_corporate(&mut self, corporate: Corporate) -> AgentId {
        let id = self.agents.insert(Agent::Corporate(corporate));
        self.corporates.push(id);
        id
    }

    pub fn add_foreign(&mut self, foreign: Foreign) -> AgentId {
        let id = self.agents.insert(Agent::Foreign(foreign));
        self.foreigns.push(id);
        id
    }

    pub fn household(&self, id: AgentId) -> Option<&Household> {
        match self.agents.get(id) {
            Some(Agent::Household(h)) => Some(h),
            _ => None,
        }
    }

    pub fn household_mut(&mut self, id: AgentId) -> Option<&mut Household> {
        match self.agents.get_mut(id) {
            Some(Agent::Household(h)) => Some(h),
            _ => None,
        }
    }

    pub fn corporate(&self, id: AgentId) -> Option<&Corporate> {
        match self.agents.get(id) {
            Some(Agent::Corporate(c)) => Some(c),
            _ => None,
        }
    }

    pub fn corporate_mut(&mut self, id: AgentId) -> Option<&mut Corporate> {
        match self.agents.get_mut(id) {
            Some(Agent::Corporate(c)) => Some(c),
            _ => None,
        }
    }

    pub fn foreign(&self, id: AgentId) -> Option<&Foreign> {
        match self.agents.get(id) {
            Some(Agent::Foreign(f)) => Some(f),
            _ => None,
        }
    }

    pub fn foreign_mut(&mut self, id: AgentId) -> Option<&mut Foreign> {
        match self.agents.get_mut(id) {
            Some(Agent::Foreign(f)) => Some(f),
            _ => None,
        }
    }

    // === Iteration ===

    /// Household ids in insertion order.
    pub fn household_ids(&self) -> &[AgentId] {
        &self.households
    }

    pub fn corporate_ids(&self) -> &[AgentId] {
        &self.corporates
    }

    pub fn foreign_ids(&self) -> &[AgentId] {
        &self.foreigns
    }

    pub fn households(&self) -> impl Iterator<Item = &Household> {
        self.households.iter().filter_map(|&id| self.household(id))
    }

    pub fn corporates(&self) -> impl Iterator<Item = &Corporate> {
        self.corporates.iter().filter_map(|&id| self.corporate(id))
    }

    pub fn foreigns(&self) -> impl Iterator<Item = &Foreign> {
        self.foreigns.iter().filter_map(|&id| self.foreign(id))
    }

    pub fn household_count(&self) -> usize {
        self.households.len()
    }

    pub fn corporate_count(&self) -> usize {
        self.corporates.len()
    }

    /// Visit every household mutably, in insertion order. Indexed lookup
    /// rather than a held iterator, so callers can capture whatever else
    /// they need in the closure.
    pub fn for_each_household_mut(&mut self, mut f: impl FnMut(&mut Household)) {
        for i in 0..self.households.len() {
            let id = self.households[i];
            if let Some(Agent::Household(h)) = self.agents.get_mut(id) {
                f(h);
            }
        }
    }

    pub fn for_each_corporate_mut(&mut self, mut f: impl FnMut(&mut Corporate)) {
        for i in 0..self.corporates.len() {
            let id = self.corporates[i];
            if let Some(Agent::Corporate(c)) = self.agents.get_mut(id) {
                f(c);
            }
        }
    }

    pub fn for_each_foreign_mut(&mut self, mut f: impl FnMut(&mut Foreign)) {
        for i in 0..self.foreigns.len() {
            let id = self.foreigns[i];
            if let Some(Agent::Foreign(a)) = self.agents.get_mut(id) {
                f(a);
            }
        }
    }

    // === Employment Relation ===
    //
    // The employer↔employee link is the one bidirectional relation in the
    // model; these helpers are the only code allowed to touch both sides.

    /// Hire `worker` into `employer`. The household takes the employer's
    /// sector, clears its unemployment clock and gig state, and is pushed
    /// onto the employee list. No-op (false) unless both ids resolve to
    /// the right kinds.
    pub fn hire(&mut self, employer: AgentId, worker: AgentId) -> bool {
        let Some([employer_agent, worker_agent]) = self.agents.get_disjoint_mut([employer, worker])
        else {
            return false;
        };
        let (Agent::Corporate(corp), Agent::Household(h)) = (employer_agent, worker_agent) else {
            return false;
        };
        h.employment = Employment::Employed;
        h.employer = Some(employer);
        h.sector = Some(corp.sector);
        h.unemployed_duration = 0;
        h.gig_worker = false;
        corp.employees.push(worker);
        true
    }

    /// Remove `worker` from `employer`'s payroll and clear the household
    /// side. No-op (false) if the pair is not currently linked.
    pub fn fire(&mut self, employer: AgentId, worker: AgentId) -> bool {
        let Some([employer_agent, worker_agent]) = self.agents.get_disjoint_mut([employer, worker])
        else {
            return false;
        };
        let (Agent::Corporate(corp), Agent::Household(h)) = (employer_agent, worker_agent) else {
            return false;
        };
        let Some(pos) = corp.employees.iter().position(|&e| e == worker) else {
            return false;
        };
        corp.employees.remove(pos);
        h.employment = Employment::Unemployed;
        h.employer = None;
        h.sector = None;
        true
    }

    /// Push `worker` out of whatever employment it holds: fires through
    /// the employer when one is linked, otherwise just zeroes the
    /// household side (gig work has no employer).
    pub fn detach(&mut self, worker: AgentId) {
        let employer = match self.household(worker) {
            Some(h) => h.employer,
            None => return,
        };
        let fired = match employer {
            Some(corp_id) => self.fire(corp_id, worker),
            None => false,
        };
        if !fired {
            if let Some(h) = self.household_mut(worker) {
                h.employment = Employment::Unemployed;
                h.employer = None;
                h.sector = None;
            }
        }
    }
}
