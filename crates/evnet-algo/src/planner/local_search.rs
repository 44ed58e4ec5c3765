//! Pairwise re-split local search.

use super::CapacityPlanner;
use evnet_core::EvNetResult;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use tracing::{debug, info};

impl CapacityPlanner {
    /// Run `local_search_iterations` steps from the current allocation.
    pub fn local_search(&mut self) -> EvNetResult<()> {
        let iterations = self.config.local_search_iterations;
        info!(iterations, "starting local search");
        for iteration in 0..iterations {
            let profit = self.local_search_step()?;
            if self.config.verbose {
                info!(iteration, profit, "local search step");
            } else {
                debug!(iteration, profit, "local search step");
            }
        }
        Ok(())
    }

    /// One step: sample a pair, re-split it, record the resulting profit.
    ///
    /// With fewer than two sites, or when no partner has positive weight,
    /// the allocation is left alone and the current profit is recorded.
    pub fn local_search_step(&mut self) -> EvNetResult<f64> {
        let profit = match self.sample_pair() {
            Some((i, j)) => self.optimize_pair(i, j)?,
            None => self.network.total_profit(),
        };
        self.history.push(profit);
        Ok(profit)
    }

    /// Pick `i` uniformly, then `j ≠ i` with probability proportional to
    /// `distance(i, j) · temperature`.
    pub(crate) fn sample_pair(&mut self) -> Option<(usize, usize)> {
        let n = self.network.num_sites();
        if n < 2 {
            return None;
        }
        let i = self.rng.gen_range(0..n);
        let temperature = self.config.sampling_temperature;
        let weights: Vec<f64> = self.network.distance_matrix()[i]
            .iter()
            .enumerate()
            .map(|(j, d)| if j == i { 0.0 } else { d * temperature })
            .collect();
        let partner = WeightedIndex::new(&weights).ok()?;
        Some((i, partner.sample(&mut self.rng)))
    }

    /// Try every split of the pair's combined stations and commit the most
    /// profitable feasible one.
    ///
    /// Site `i` ranges over its capacity bounds, site `j` takes what is left
    /// of the pair total within its own bounds. The incumbent split wins ties,
    /// so the returned profit is never below the profit before the call.
    pub fn optimize_pair(&mut self, i: usize, j: usize) -> EvNetResult<f64> {
        let incumbent = self.network.allocation();
        let available = incumbent.get(i) + incumbent.get(j);
        let (min_i, max_i) = {
            let site = self.network.site(i);
            (site.min_capacity, site.max_capacity)
        };
        let (min_j, max_j) = {
            let site = self.network.site(j);
            (site.min_capacity, site.max_capacity)
        };

        let mut best = (incumbent.get(i), incumbent.get(j));
        let mut best_profit = self.network.total_profit();
        let mut candidate = incumbent.clone();

        for a in min_i..=max_i.min(available) {
            for b in min_j..=max_j.min(available - a) {
                candidate.set(i, a);
                candidate.set(j, b);
                if !self.is_feasible(&candidate) {
                    continue;
                }
                self.network.apply_allocation(&candidate)?;
                let profit = self.network.total_profit();
                if profit > best_profit {
                    best = (a, b);
                    best_profit = profit;
                }
            }
        }

        candidate.set(i, best.0);
        candidate.set(j, best.1);
        self.network.apply_allocation(&candidate)?;
        if best != (incumbent.get(i), incumbent.get(j)) {
            debug!(i, j, from = ?(incumbent.get(i), incumbent.get(j)), to = ?best, best_profit, "re-split pair");
        }
        Ok(self.network.total_profit())
    }
}
