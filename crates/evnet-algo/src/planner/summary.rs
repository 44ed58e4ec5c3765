//! Plan summary data structures

use super::CapacityPlanner;
use evnet_core::Site;
use serde::Serialize;
use std::time::Duration;

/// Outcome at one site
#[derive(Debug, Clone, Serialize)]
pub struct SitePlan {
    pub id: usize,
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub stations: usize,
    pub min_capacity: usize,
    pub max_capacity: usize,
    pub arrival_rate: f64,
    pub effective_arrival_rate: f64,
    pub expected_utilization: f64,
    pub percentage_utilization: Option<f64>,
    pub profit: f64,
}

impl From<&Site> for SitePlan {
    fn from(site: &Site) -> Self {
        Self {
            id: site.id.value(),
            name: site.name.clone(),
            latitude: site.location.latitude,
            longitude: site.location.longitude,
            stations: site.num_stations,
            min_capacity: site.min_capacity,
            max_capacity: site.max_capacity,
            arrival_rate: site.arrival_rate,
            effective_arrival_rate: site.effective_arrival_rate,
            expected_utilization: site.expected_utilization(),
            percentage_utilization: site.expected_percentage_utilization(),
            profit: site.profit(),
        }
    }
}

/// Snapshot of a planner's current allocation and search record
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub feasible: bool,
    pub violations: Vec<String>,
    pub solver: String,
    pub budget: usize,
    pub total_stations: usize,
    pub total_profit: f64,
    pub total_expected_utilization: f64,
    pub percentage_utilization: Option<f64>,
    /// Relaxation objective (spillover ignored)
    pub relaxation_objective: Option<f64>,
    /// Spillover-aware profit right after the relaxation
    pub relaxation_profit: Option<f64>,
    pub local_search_history: Vec<f64>,
    #[serde(skip)]
    pub solve_time: Duration,
    pub solve_time_ms: u128,
    pub sites: Vec<SitePlan>,
}

impl PlanSummary {
    pub fn from_planner(planner: &CapacityPlanner) -> Self {
        let network = planner.network();
        let diagnostics = planner.check_feasibility(&network.allocation());
        Self {
            feasible: !diagnostics.has_errors(),
            violations: diagnostics.errors().map(|issue| issue.to_string()).collect(),
            solver: planner.config().solver.to_string(),
            budget: planner.budget(),
            total_stations: network.total_charging_stations(),
            total_profit: network.total_profit(),
            total_expected_utilization: network.total_expected_utilization(),
            percentage_utilization: network.total_expected_percentage_utilization(),
            relaxation_objective: planner.relaxation_objective(),
            relaxation_profit: planner.relaxation_profit(),
            local_search_history: planner.history().to_vec(),
            solve_time: planner.solve_time(),
            solve_time_ms: planner.solve_time().as_millis(),
            sites: network.sites().iter().map(SitePlan::from).collect(),
        }
    }

    pub fn sites_with_stations(&self) -> usize {
        self.sites.iter().filter(|s| s.stations > 0).count()
    }

    /// Profit gained by local search over the relaxation's allocation
    pub fn local_search_gain(&self) -> Option<f64> {
        self.relaxation_profit.map(|p| self.total_profit - p)
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Capacity Plan Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!(
            "Status: {}\n",
            if self.feasible { "Feasible" } else { "Infeasible" }
        ));
        s.push_str(&format!("Solver: {}\n", self.solver));
        s.push_str(&format!(
            "Stations: {} / {} budget at {} sites\n",
            self.total_stations,
            self.budget,
            self.sites_with_stations()
        ));
        s.push_str(&format!("Total Profit: {:.4}\n", self.total_profit));
        if let Some(objective) = self.relaxation_objective {
            s.push_str(&format!("  Relaxation objective: {:.4}\n", objective));
        }
        if let Some(gain) = self.local_search_gain() {
            s.push_str(&format!("  Local search gain: {:+.4}\n", gain));
        }
        match self.percentage_utilization {
            Some(pct) => s.push_str(&format!("Utilization: {:.2}%\n", pct)),
            None => s.push_str("Utilization: n/a\n"),
        }
        s.push_str(&format!(
            "Local Search: {} iterations\n",
            self.local_search_history.len()
        ));
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));

        if !self.violations.is_empty() {
            s.push_str("\nViolations:\n");
            for violation in &self.violations {
                s.push_str(&format!("  {}\n", violation));
            }
        }

        if !self.sites.is_empty() {
            s.push_str("\nSites:\n");
            for site in &self.sites {
                let label = site
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Site {}", site.id));
                if site.stations > 0 {
                    s.push_str(&format!(
                        "  [OPEN] {} x{} - profit {:.4}\n",
                        label, site.stations, site.profit
                    ));
                } else {
                    s.push_str(&format!("  [SKIP] {}\n", label));
                }
            }
        }

        s
    }
}
