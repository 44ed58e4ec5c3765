//! Site network with spatial spillover.

use crate::allocation::Allocation;
use crate::error::{EvNetError, EvNetResult};
use crate::site::Site;
use std::collections::HashSet;
use tracing::debug;

/// A set of sites, their pairwise distances and the spillover coupling
/// between them.
///
/// Site positions are static, so the distance matrix is computed once.
/// Station counts change only through [`Network::apply_allocation`], which
/// refreshes every effective arrival rate before returning; aggregate
/// queries are therefore always consistent with the current allocation.
#[derive(Debug, Clone)]
pub struct Network {
    sites: Vec<Site>,
    gamma: f64,
    distance_matrix: Vec<Vec<f64>>,
}

impl Network {
    /// Validate the sites, compute distances and initial effective rates.
    ///
    /// `gamma` is the spatial decay of the spillover kernel `exp(-gamma * d^2)`
    /// with `d` in kilometres.
    pub fn new(sites: Vec<Site>, gamma: f64) -> EvNetResult<Self> {
        if !gamma.is_finite() || gamma < 0.0 {
            return Err(EvNetError::Validation(format!(
                "gamma must be finite and non-negative, got {gamma}"
            )));
        }
        let mut seen = HashSet::new();
        for site in &sites {
            site.validate()?;
            if !seen.insert(site.id) {
                return Err(EvNetError::Validation(format!(
                    "duplicate site id {}",
                    site.id.value()
                )));
            }
        }

        let distance_matrix = Self::compute_distance_matrix(&sites);
        let mut network = Self {
            sites,
            gamma,
            distance_matrix,
        };
        network.update_effective_arrival_rates();
        debug!(
            num_sites = network.sites.len(),
            gamma, "network initialized"
        );
        Ok(network)
    }

    /// Symmetric great-circle distance matrix (km) with a zero diagonal.
    pub fn compute_distance_matrix(sites: &[Site]) -> Vec<Vec<f64>> {
        let n = sites.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = sites[i].location.distance(&sites[j].location).value();
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }
        matrix
    }

    /// Recompute each occupied site's effective arrival rate.
    ///
    /// ```text
    /// λ_eff(i) = λ(i) / Σ_j exp(-γ d_ij²) · n_j / n_i
    /// ```
    ///
    /// Sites with no stations keep their previous rate.
    pub fn update_effective_arrival_rates(&mut self) {
        let stations: Vec<f64> = self.sites.iter().map(|s| s.num_stations as f64).collect();
        for (i, site) in self.sites.iter_mut().enumerate() {
            if site.num_stations == 0 {
                continue;
            }
            let own = stations[i];
            let divisor: f64 = self.distance_matrix[i]
                .iter()
                .zip(&stations)
                .map(|(d, n_j)| (-self.gamma * d * d).exp() * (n_j / own))
                .sum();
            site.effective_arrival_rate = site.arrival_rate / divisor;
        }
    }

    /// Set every site's station count, then refresh effective rates.
    pub fn apply_allocation(&mut self, allocation: &Allocation) -> EvNetResult<()> {
        if allocation.len() != self.sites.len() {
            return Err(EvNetError::Validation(format!(
                "allocation has {} entries for {} sites",
                allocation.len(),
                self.sites.len()
            )));
        }
        for (site, &stations) in self.sites.iter_mut().zip(allocation.iter()) {
            site.num_stations = stations;
        }
        self.update_effective_arrival_rates();
        Ok(())
    }

    /// Snapshot of the current station counts
    pub fn allocation(&self) -> Allocation {
        Allocation::new(self.sites.iter().map(|s| s.num_stations).collect())
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, index: usize) -> &Site {
        &self.sites[index]
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn distance_matrix(&self) -> &[Vec<f64>] {
        &self.distance_matrix
    }

    /// Distance between sites `i` and `j` in kilometres
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    pub fn total_charging_stations(&self) -> usize {
        self.sites.iter().map(|s| s.num_stations).sum()
    }

    /// Stations over a subset of sites (e.g. a reference neighborhood)
    pub fn stations_within(&self, indices: &[usize]) -> usize {
        indices.iter().map(|&i| self.sites[i].num_stations).sum()
    }

    pub fn total_expected_utilization(&self) -> f64 {
        self.sites.iter().map(Site::expected_utilization).sum()
    }

    /// Network-wide utilization in percent; `None` with zero stations.
    pub fn total_expected_percentage_utilization(&self) -> Option<f64> {
        let total = self.total_charging_stations();
        if total == 0 {
            return None;
        }
        Some(self.total_expected_utilization() / total as f64 * 100.0)
    }

    pub fn total_profit(&self) -> f64 {
        self.sites.iter().map(Site::profit).sum()
    }
}
