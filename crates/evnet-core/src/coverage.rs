//! Coverage requirements around reference locations.

use crate::allocation::Allocation;
use crate::error::{EvNetError, EvNetResult};
use crate::location::GeoLocation;
use crate::site::Site;
use crate::units::Kilometers;
use serde::{Deserialize, Serialize};

/// A point that needs at least `min_supply` stations among the sites within
/// `neighborhood_radius`.
///
/// The neighborhood is cached derived state: call
/// [`ReferenceLocation::update_neighborhood_sites`] whenever the site roster
/// or the radius changes. An unresolved neighborhood is treated as empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceLocation {
    pub location: GeoLocation,
    pub neighborhood_radius: Kilometers,
    pub min_supply: usize,
    #[serde(skip)]
    neighborhood_sites: Option<Vec<usize>>,
}

impl ReferenceLocation {
    pub fn new(location: GeoLocation, neighborhood_radius: Kilometers, min_supply: usize) -> Self {
        Self {
            location,
            neighborhood_radius,
            min_supply,
            neighborhood_sites: None,
        }
    }

    pub fn validate(&self) -> EvNetResult<()> {
        self.location.validate()?;
        if !self.neighborhood_radius.is_finite() || self.neighborhood_radius.value() <= 0.0 {
            return Err(EvNetError::Validation(format!(
                "reference location {}: neighborhood radius must be positive, got {}",
                self.location, self.neighborhood_radius
            )));
        }
        Ok(())
    }

    /// Change the radius; invalidates the cached neighborhood.
    pub fn set_neighborhood_radius(&mut self, radius: Kilometers) {
        self.neighborhood_radius = radius;
        self.neighborhood_sites = None;
    }

    /// Recompute the indices of sites strictly closer than the radius.
    pub fn update_neighborhood_sites(&mut self, sites: &[Site]) {
        let neighborhood = sites
            .iter()
            .enumerate()
            .filter(|(_, site)| self.location.distance(&site.location) < self.neighborhood_radius)
            .map(|(i, _)| i)
            .collect();
        self.neighborhood_sites = Some(neighborhood);
    }

    pub fn is_resolved(&self) -> bool {
        self.neighborhood_sites.is_some()
    }

    /// Sorted site indices in the neighborhood (empty until resolved)
    pub fn neighborhood_sites(&self) -> &[usize] {
        self.neighborhood_sites.as_deref().unwrap_or(&[])
    }

    pub fn covers(&self, site_index: usize) -> bool {
        self.neighborhood_sites().binary_search(&site_index).is_ok()
    }

    /// Stations an allocation places in the neighborhood
    pub fn supply(&self, allocation: &Allocation) -> usize {
        allocation.total_over(self.neighborhood_sites())
    }

    /// Most stations the neighborhood could ever hold
    pub fn max_reachable_supply(&self, sites: &[Site]) -> usize {
        self.neighborhood_sites()
            .iter()
            .map(|&i| sites[i].max_capacity)
            .sum()
    }
}
