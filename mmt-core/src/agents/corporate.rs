//! Corporate agents: employers carrying capital and a per-tick P&L.

use serde::{Deserialize, Serialize};

use crate::types::{AgentId, Money, Sector};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corporate {
    pub sector: Sector,
    pub capital: Money,
    /// Arena keys of current employees, in hire order.
    pub employees: Vec<AgentId>,
    pub production: f64,
    pub revenue: Money,
    pub profit: Money,
    pub tax_paid: Money,
    /// Posted positions; matching fills up to this many, automation
    /// discounts the rest away.
    pub job_openings: u32,
    pub automation_level: f64,
}

impl Corporate {
    pub fn new(sector: Sector) -> Self {
        Self {
            sector,
            capital: 100_000.0,
            employees: Vec::new(),
            production: 0.0,
            revenue: 0.0,
            profit: 0.0,
            tax_paid: 0.0,
            job_openings: 0,
            automation_level: 0.0,
        }
    }

    pub fn with_job_openings(mut self, openings: u32) -> Self {
        self.job_openings = openings;
        self
    }

    pub fn with_capital(mut self, capital: Money) -> Self {
        self.capital = capital;
        self
    }

    pub fn headcount(&self) -> usize {
        self.employees.len()
    }

    /// Unfilled postings after the automation discount, floored.
    pub fn effective_openings(&self) -> u32 {
        let unfilled = self.job_openings.saturating_sub(self.employees.len() as u32);
        (unfilled as f64 * (1.0 - self.automation_level)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn automation_discounts_openings() {
        let mut corp = Corporate::new(Sector::Services).with_job_openings(10);
        assert_eq!(corp.effective_openings(), 10);

        corp.automation_level = 0.35;
        assert_eq!(corp.effective_openings(), 6, "10 * 0.65 floors to 6");

        corp.automation_level = 1.0;
        assert_eq!(corp.effective_openings(), 0);
    }

    #[test]
    fn filled_positions_reduce_openings() {
        let mut corp = Corporate::new(Sector::Technology).with_job_openings(3);
        corp.employees = vec![AgentId::default(); 5];
        assert_eq!(corp.effective_openings(), 0, "overfilled posts never go negative");
    }
}
