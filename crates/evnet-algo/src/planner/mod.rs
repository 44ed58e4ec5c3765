//! Capacity planning for an EV charging network.
//!
//! Two stages:
//!
//! 1. **Relaxation**: a separable MILP ([`RelaxationProblem`]) that ignores
//!    spillover between sites and yields a feasible starting allocation.
//! 2. **Local search**: repeatedly pick a pair of sites, biased towards pairs
//!    far apart, and re-split their combined stations exhaustively under the
//!    full spillover model. A re-split is kept only when it strictly improves
//!    total profit, so the recorded profit history never decreases.
//!
//! ```no_run
//! use evnet_algo::planner::{CapacityPlanner, PlannerConfig};
//! # fn demo(network: evnet_core::Network) -> evnet_core::EvNetResult<()> {
//! let config = PlannerConfig::default().with_seed(7).with_iterations(50);
//! let mut planner = CapacityPlanner::new(network, Vec::new(), 20, config)?;
//! planner.solve()?;
//! println!("{}", planner.summary().summary());
//! # Ok(())
//! # }
//! ```

mod config;
mod feasibility;
mod local_search;
mod relaxation;
mod summary;

pub use config::{MipSolverKind, PlannerConfig};
pub use feasibility::{check_feasibility, is_feasible};
pub use relaxation::{
    adjusted_capacity_caps, marginal_profits, CoverageRow, RelaxationOutcome, RelaxationProblem,
};
pub use summary::{PlanSummary, SitePlan};

use evnet_core::{Allocation, Diagnostics, EvNetError, EvNetResult, Network, ReferenceLocation};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Relaxation-then-local-search planner over a [`Network`].
///
/// The planner owns the network; every allocation it evaluates is applied to
/// the network, and the network always ends on the best allocation found.
#[derive(Debug)]
pub struct CapacityPlanner {
    network: Network,
    reference_locations: Vec<ReferenceLocation>,
    budget: usize,
    config: PlannerConfig,
    history: Vec<f64>,
    relaxation_objective: Option<f64>,
    relaxation_profit: Option<f64>,
    solve_time: Duration,
    rng: StdRng,
}

impl CapacityPlanner {
    /// Prepare a planner.
    ///
    /// Resolves every reference neighborhood against the network and rejects
    /// instances that are infeasible on their face: minimum capacities that
    /// exceed the budget, or coverage requirements larger than the budget or
    /// than the neighborhood could ever hold.
    pub fn new(
        network: Network,
        mut reference_locations: Vec<ReferenceLocation>,
        budget: usize,
        config: PlannerConfig,
    ) -> EvNetResult<Self> {
        config.validate()?;
        for reference in &mut reference_locations {
            reference.validate()?;
            reference.update_neighborhood_sites(network.sites());
        }

        let required: usize = network.sites().iter().map(|s| s.min_capacity).sum();
        if required > budget {
            return Err(EvNetError::Infeasible(format!(
                "minimum capacities need {required} stations, budget is {budget}"
            )));
        }
        for reference in &reference_locations {
            if reference.min_supply > budget {
                return Err(EvNetError::Infeasible(format!(
                    "reference at {} needs {} stations, budget is {budget}",
                    reference.location, reference.min_supply
                )));
            }
            let reachable = reference.max_reachable_supply(network.sites());
            if reference.min_supply > reachable {
                return Err(EvNetError::Infeasible(format!(
                    "reference at {} needs {} stations, its neighborhood holds at most {reachable}",
                    reference.location, reference.min_supply
                )));
            }
        }

        let rng = config
            .seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);

        Ok(Self {
            network,
            reference_locations,
            budget,
            config,
            history: Vec::new(),
            relaxation_objective: None,
            relaxation_profit: None,
            solve_time: Duration::ZERO,
            rng,
        })
    }

    /// Relaxation followed by the configured number of local-search steps.
    pub fn solve(&mut self) -> EvNetResult<()> {
        let start = Instant::now();
        self.solve_relaxation()?;
        self.local_search()?;
        self.solve_time = start.elapsed();

        if !self.is_feasible(&self.network.allocation()) {
            // local search only commits feasible re-splits
            warn!("final allocation violates a constraint");
        }
        info!(
            stations = self.network.total_charging_stations(),
            profit = self.network.total_profit(),
            elapsed = ?self.solve_time,
            "planning finished"
        );
        Ok(())
    }

    /// Solve the relaxation and apply its allocation to the network.
    pub fn solve_relaxation(&mut self) -> EvNetResult<RelaxationOutcome> {
        let problem = self.relaxation_problem();
        let outcome = problem.solve(&self.config)?;
        self.network.apply_allocation(&outcome.allocation)?;
        self.relaxation_objective = Some(outcome.objective);
        self.relaxation_profit = Some(self.network.total_profit());
        Ok(outcome)
    }

    /// The relaxation for the current network, references and budget
    pub fn relaxation_problem(&self) -> RelaxationProblem {
        RelaxationProblem::build(
            &self.network,
            &self.reference_locations,
            self.budget,
            self.config.epsilon,
        )
    }

    /// Every constraint violation of `allocation`
    pub fn check_feasibility(&self, allocation: &Allocation) -> Diagnostics {
        check_feasibility(
            &self.network,
            &self.reference_locations,
            self.budget,
            allocation,
        )
    }

    pub fn is_feasible(&self, allocation: &Allocation) -> bool {
        !self.check_feasibility(allocation).has_errors()
    }

    /// Marginal profit table used by the relaxation
    pub fn marginal_profits(&self) -> Vec<Vec<f64>> {
        self.network.sites().iter().map(marginal_profits).collect()
    }

    /// Spatially tightened capacity caps used by the relaxation
    pub fn adjusted_capacities(&self) -> Vec<usize> {
        adjusted_capacity_caps(&self.network, self.config.epsilon)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn reference_locations(&self) -> &[ReferenceLocation] {
        &self.reference_locations
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Total profit after each local-search step
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn relaxation_objective(&self) -> Option<f64> {
        self.relaxation_objective
    }

    /// Spillover-aware profit of the relaxation's allocation
    pub fn relaxation_profit(&self) -> Option<f64> {
        self.relaxation_profit
    }

    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }

    /// Snapshot of the current plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary::from_planner(self)
    }
}
