//! Separable MILP relaxation of the capacity planning problem.
//!
//! Each site's profit is split into per-station increments: adding the k-th
//! station to site i contributes its marginal profit `m[i][k]` measured with
//! spillover switched off. One binary slot `z[i][k]` decides each increment.
//!
//! ```text
//! maximise   Σ_i Σ_k m[i][k] · z[i][k]
//! subject to Σ_i Σ_k z[i][k]            ≤ budget
//!            min_i ≤ Σ_k z[i][k]        ≤ cap_i
//!            Σ_{i ∈ N(r)} Σ_k z[i][k]   ≥ min_supply(r)   for every reference r
//!            z[i][k] ≥ z[i][k+1]                          (slots fill in order)
//! ```
//!
//! `cap_i` tightens the site's own maximum by a spatial term that grows with
//! the distance to its nearest neighbour:
//!
//! ```text
//! cap_i = floor(min(max_capacity_i, min_{j≠i} ε · exp(γ d_ij²)))
//! ```

use super::config::{MipSolverKind, PlannerConfig};
use evnet_core::{Allocation, EvNetError, EvNetResult, Network, ReferenceLocation, Site};
use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};
use std::time::Instant;
use tracing::info;

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs;

/// Profit gained by each additional station at `site`, ignoring spillover.
///
/// Entry `k` is `profit(k + 1) - profit(k)` with `profit(0)` taken as zero,
/// so the first entry also absorbs the site's fixed term.
pub fn marginal_profits(site: &Site) -> Vec<f64> {
    let mut probe = site.clone();
    probe.effective_arrival_rate = site.arrival_rate;
    probe.num_stations = 0;

    let mut previous = 0.0;
    (0..site.max_capacity)
        .map(|_| {
            probe.num_stations += 1;
            let profit = probe.profit();
            let marginal = profit - previous;
            previous = profit;
            marginal
        })
        .collect()
}

/// Per-site capacity caps tightened by proximity to other sites.
///
/// A site with no other sites keeps its own maximum.
pub fn adjusted_capacity_caps(network: &Network, epsilon: f64) -> Vec<usize> {
    let gamma = network.gamma();
    network
        .sites()
        .iter()
        .enumerate()
        .map(|(i, site)| {
            let spatial = network.distance_matrix()[i]
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, d)| epsilon * (gamma * d * d).exp())
                .fold(f64::INFINITY, f64::min);
            (site.max_capacity as f64).min(spatial).floor() as usize
        })
        .collect()
}

/// One coverage row of the relaxation
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRow {
    pub sites: Vec<usize>,
    pub min_supply: usize,
}

/// Data of the relaxation, detached from the network so it can be inspected
/// before solving.
#[derive(Debug, Clone)]
pub struct RelaxationProblem {
    /// `marginal_profits[i][k]`: gain of the (k+1)-th station at site i
    pub marginal_profits: Vec<Vec<f64>>,
    pub capacity_caps: Vec<usize>,
    pub min_capacities: Vec<usize>,
    pub coverage: Vec<CoverageRow>,
    pub budget: usize,
}

/// Relaxation result
#[derive(Debug, Clone)]
pub struct RelaxationOutcome {
    pub allocation: Allocation,
    /// Relaxation objective at `allocation`
    pub objective: f64,
}

impl RelaxationProblem {
    /// Build the relaxation for the network's sites.
    ///
    /// Reference neighborhoods must already be resolved against the network.
    pub fn build(
        network: &Network,
        reference_locations: &[ReferenceLocation],
        budget: usize,
        epsilon: f64,
    ) -> Self {
        Self {
            marginal_profits: network.sites().iter().map(marginal_profits).collect(),
            capacity_caps: adjusted_capacity_caps(network, epsilon),
            min_capacities: network.sites().iter().map(|s| s.min_capacity).collect(),
            coverage: reference_locations
                .iter()
                .map(|r| CoverageRow {
                    sites: r.neighborhood_sites().to_vec(),
                    min_supply: r.min_supply,
                })
                .collect(),
            budget,
        }
    }

    pub fn num_sites(&self) -> usize {
        self.marginal_profits.len()
    }

    /// Number of binary slots
    pub fn num_variables(&self) -> usize {
        self.marginal_profits.iter().map(Vec::len).sum()
    }

    /// Relaxation objective of an allocation (sum of filled slot gains).
    pub fn objective_value(&self, allocation: &Allocation) -> f64 {
        self.marginal_profits
            .iter()
            .zip(allocation.iter())
            .map(|(row, &n)| row.iter().take(n).sum::<f64>())
            .sum()
    }

    /// Whether an allocation satisfies every relaxation constraint.
    pub fn admits(&self, allocation: &Allocation) -> bool {
        allocation.len() == self.num_sites()
            && allocation.total() <= self.budget
            && allocation
                .iter()
                .zip(self.capacity_caps.iter().zip(&self.min_capacities))
                .all(|(&n, (&cap, &min))| n >= min && n <= cap)
            && self
                .coverage
                .iter()
                .all(|row| allocation.total_over(&row.sites) >= row.min_supply)
    }

    /// Solve with the configured backend.
    pub fn solve(&self, config: &PlannerConfig) -> EvNetResult<RelaxationOutcome> {
        config.validate()?;
        let start = Instant::now();
        info!(
            sites = self.num_sites(),
            variables = self.num_variables(),
            budget = self.budget,
            solver = %config.solver,
            "solving relaxation"
        );

        // Nothing to decide: only the all-zero allocation exists
        if self.num_variables() == 0 {
            let allocation = Allocation::zeros(self.num_sites());
            if !self.admits(&allocation) {
                return Err(EvNetError::Infeasible(
                    "no station slots available but minimum capacity or coverage is positive"
                        .to_string(),
                ));
            }
            return Ok(RelaxationOutcome {
                objective: 0.0,
                allocation,
            });
        }

        let mut vars = variables!();
        let slots: Vec<Vec<Variable>> = self
            .marginal_profits
            .iter()
            .map(|row| row.iter().map(|_| vars.add(variable().binary())).collect())
            .collect();

        let mut objective = Expression::from(0.0);
        for (row, site_slots) in self.marginal_profits.iter().zip(&slots) {
            for (&gain, z) in row.iter().zip(site_slots) {
                objective += gain * *z;
            }
        }
        let unsolved = vars.maximise(objective);

        let counts = match config.solver {
            MipSolverKind::Microlp => {
                let model = self.add_constraints(unsolved.using(microlp), &slots);
                slot_counts(model.solve(), &slots)?
            }
            #[cfg(feature = "solver-highs")]
            MipSolverKind::Highs => {
                let mut model = unsolved.using(highs).set_verbose(config.verbose);
                if let Some(gap) = config.mip_gap {
                    model = model.set_option("mip_rel_gap", gap);
                }
                if let Some(limit) = config.time_limit_secs {
                    model = model.set_option("time_limit", limit);
                }
                let model = self.add_constraints(model, &slots);
                slot_counts(model.solve(), &slots)?
            }
        };

        let allocation = Allocation::new(counts);
        let objective = self.objective_value(&allocation);
        info!(
            stations = allocation.total(),
            objective,
            elapsed = ?start.elapsed(),
            "relaxation solved"
        );
        Ok(RelaxationOutcome {
            allocation,
            objective,
        })
    }

    fn add_constraints<M: SolverModel>(&self, mut model: M, slots: &[Vec<Variable>]) -> M {
        let site_totals: Vec<Expression> = slots
            .iter()
            .map(|site_slots| {
                let mut total = Expression::from(0.0);
                for z in site_slots {
                    total += *z;
                }
                total
            })
            .collect();

        // Budget
        let mut stations = Expression::from(0.0);
        for total in &site_totals {
            stations += total.clone();
        }
        let budget = self.budget as f64;
        model = model.with(constraint!(stations <= budget));

        // Per-site bounds
        for (i, total) in site_totals.iter().enumerate() {
            let cap = self.capacity_caps[i] as f64;
            let min = self.min_capacities[i] as f64;
            model = model.with(constraint!(total.clone() <= cap));
            model = model.with(constraint!(total.clone() >= min));
        }

        // Coverage
        for row in &self.coverage {
            let mut supply = Expression::from(0.0);
            for &i in &row.sites {
                supply += site_totals[i].clone();
            }
            let required = row.min_supply as f64;
            model = model.with(constraint!(supply >= required));
        }

        // Slot ordering
        for site_slots in slots {
            for pair in site_slots.windows(2) {
                let (current, next) = (pair[0], pair[1]);
                model = model.with(constraint!(current >= next));
            }
        }

        model
    }
}

fn slot_counts<S: Solution>(
    result: Result<S, ResolutionError>,
    slots: &[Vec<Variable>],
) -> EvNetResult<Vec<usize>> {
    let solution = result.map_err(|e| match e {
        ResolutionError::Infeasible => {
            EvNetError::Infeasible("relaxation has no feasible allocation".to_string())
        }
        other => EvNetError::Solver(other.to_string()),
    })?;
    Ok(slots
        .iter()
        .map(|site_slots| {
            site_slots
                .iter()
                .filter(|z| solution.value(**z) > 0.5)
                .count()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evnet_core::{GeoLocation, Kilometers, SiteEconomics};

    fn economics() -> SiteEconomics {
        SiteEconomics {
            fixed_cost: 1.0,
            variable_cost: 0.5,
            unit_revenue: 2.0,
            arrival_rate: 5.0,
            mean_service_time: 1.0,
        }
    }

    fn line_network(spacing_deg: f64, gamma: f64, max: usize) -> Network {
        let sites = (0..3)
            .map(|i| {
                Site::new(i, GeoLocation::new(0.0, i as f64 * spacing_deg), economics())
                    .with_capacity(0, max)
            })
            .collect();
        Network::new(sites, gamma).unwrap()
    }

    #[test]
    fn test_marginal_profits_telescope() {
        let site = Site::new(0, GeoLocation::new(0.0, 0.0), economics()).with_capacity(0, 4);
        let marginals = marginal_profits(&site);
        assert_eq!(marginals.len(), 4);

        let mut probe = site.clone().with_stations(4);
        probe.effective_arrival_rate = probe.arrival_rate;
        let total: f64 = marginals.iter().sum();
        assert!((total - probe.profit()).abs() < 1e-9);
        // first station: 2 * 5/6 - (0.5 - 1)
        assert!((marginals[0] - (2.0 * 5.0 / 6.0 + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_marginal_profits_ignore_current_spillover() {
        let mut site = Site::new(0, GeoLocation::new(0.0, 0.0), economics()).with_capacity(0, 2);
        let baseline = marginal_profits(&site);
        site.effective_arrival_rate = 0.1;
        site.num_stations = 2;
        assert_eq!(marginal_profits(&site), baseline);
    }

    #[test]
    fn test_capacity_caps() {
        // ~3 km apart, gamma 0.5: spatial cap 0.05 * e^4.5 ~ 4.5
        let network = line_network(0.027, 0.5, 3);
        assert_eq!(adjusted_capacity_caps(&network, 0.05), vec![3, 3, 3]);
        let network = line_network(0.027, 0.5, 10);
        assert_eq!(adjusted_capacity_caps(&network, 0.05), vec![4, 4, 4]);
        // ~0.3 km apart: cap collapses to zero
        let network = line_network(0.0027, 0.5, 10);
        assert_eq!(adjusted_capacity_caps(&network, 0.05), vec![0, 0, 0]);
    }

    #[test]
    fn test_single_site_keeps_max_capacity() {
        let site = Site::new(0, GeoLocation::new(0.0, 0.0), economics()).with_capacity(0, 7);
        let network = Network::new(vec![site], 1.0).unwrap();
        assert_eq!(adjusted_capacity_caps(&network, 0.05), vec![7]);
    }

    #[test]
    fn test_solve_respects_budget() {
        let network = line_network(0.027, 0.5, 3);
        let problem = RelaxationProblem::build(&network, &[], 5, 0.05);
        assert_eq!(problem.num_variables(), 9);

        let outcome = problem.solve(&PlannerConfig::default()).unwrap();
        assert_eq!(outcome.allocation.total(), 5);
        assert!(problem.admits(&outcome.allocation));
        assert!((outcome.objective - problem.objective_value(&outcome.allocation)).abs() < 1e-9);
    }

    #[test]
    fn test_solve_honours_coverage() {
        let network = line_network(0.027, 0.5, 3);
        let mut reference =
            ReferenceLocation::new(GeoLocation::new(0.0, 0.0135), Kilometers(2.0), 4);
        reference.update_neighborhood_sites(network.sites());
        let problem = RelaxationProblem::build(&network, &[reference], 5, 0.05);

        let outcome = problem.solve(&PlannerConfig::default()).unwrap();
        assert!(outcome.allocation.total_over(&[0, 1]) >= 4);
        assert!(outcome.allocation.total() <= 5);
    }

    #[test]
    fn test_unreachable_coverage_is_infeasible() {
        let network = line_network(0.027, 0.5, 3);
        let mut reference =
            ReferenceLocation::new(GeoLocation::new(0.0, 0.0135), Kilometers(2.0), 7);
        reference.update_neighborhood_sites(network.sites());
        let problem = RelaxationProblem::build(&network, &[reference], 9, 0.05);

        let err = problem.solve(&PlannerConfig::default()).unwrap_err();
        assert!(matches!(err, EvNetError::Infeasible(_)));
    }

    #[test]
    fn test_no_slots() {
        let network = line_network(0.027, 0.5, 0);
        let problem = RelaxationProblem::build(&network, &[], 3, 0.05);
        let outcome = problem.solve(&PlannerConfig::default()).unwrap();
        assert_eq!(outcome.allocation, Allocation::zeros(3));
        assert_eq!(outcome.objective, 0.0);
    }
}
