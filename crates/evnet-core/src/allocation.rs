//! Station allocation vector.

use serde::{Deserialize, Serialize};

/// Station count per site, indexed like [`crate::Network::sites`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation(Vec<usize>);

impl Allocation {
    pub fn new(stations: Vec<usize>) -> Self {
        Allocation(stations)
    }

    /// All-zero allocation for `num_sites` sites
    pub fn zeros(num_sites: usize) -> Self {
        Allocation(vec![0; num_sites])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stations at site `index`. Panics when out of range.
    pub fn get(&self, index: usize) -> usize {
        self.0[index]
    }

    pub fn set(&mut self, index: usize, stations: usize) {
        self.0[index] = stations;
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Sum over a subset of site indices
    pub fn total_over(&self, indices: &[usize]) -> usize {
        indices.iter().map(|&i| self.0[i]).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.0.iter()
    }
}

impl From<Vec<usize>> for Allocation {
    fn from(stations: Vec<usize>) -> Self {
        Allocation(stations)
    }
}
