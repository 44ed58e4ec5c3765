//! Charging sites: economics and the queueing model behind them.

use crate::error::{EvNetError, EvNetResult};
use crate::location::GeoLocation;
use serde::{Deserialize, Serialize};

/// Unique identifier for a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(usize);

impl SiteId {
    #[inline]
    pub fn new(value: usize) -> Self {
        SiteId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Site#{}", self.0)
    }
}

/// Static economic and demand parameters of a site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteEconomics {
    /// Fixed cost, subtracted as a constant (recovered from revenue)
    pub fixed_cost: f64,
    /// Cost per installed station
    pub variable_cost: f64,
    /// Revenue per busy station
    pub unit_revenue: f64,
    /// Nominal arrival rate before spillover
    pub arrival_rate: f64,
    /// Mean time a vehicle occupies a station
    pub mean_service_time: f64,
}

/// A candidate charging site.
///
/// `num_stations` is the decision variable. It is mutated by the planner
/// through [`crate::Network::apply_allocation`]; `effective_arrival_rate` is
/// derived state refreshed by the network after every such change.
#[derive(Debug, Clone, Serialize)]
pub struct Site {
    pub id: SiteId,
    pub name: Option<String>,
    pub location: GeoLocation,
    pub fixed_cost: f64,
    pub variable_cost: f64,
    pub unit_revenue: f64,
    pub arrival_rate: f64,
    /// Arrival rate after spatial spillover; starts equal to `arrival_rate`
    pub effective_arrival_rate: f64,
    pub mean_service_time: f64,
    pub num_stations: usize,
    pub min_capacity: usize,
    /// A site with `max_capacity == 0` cannot host stations.
    pub max_capacity: usize,
}

impl Site {
    /// Create a site with no stations and zero capacity bounds.
    pub fn new(id: usize, location: GeoLocation, economics: SiteEconomics) -> Self {
        Self {
            id: SiteId::new(id),
            name: None,
            location,
            fixed_cost: economics.fixed_cost,
            variable_cost: economics.variable_cost,
            unit_revenue: economics.unit_revenue,
            arrival_rate: economics.arrival_rate,
            effective_arrival_rate: economics.arrival_rate,
            mean_service_time: economics.mean_service_time,
            num_stations: 0,
            min_capacity: 0,
            max_capacity: 0,
        }
    }

    /// Set the capacity bounds
    pub fn with_capacity(mut self, min_capacity: usize, max_capacity: usize) -> Self {
        self.min_capacity = min_capacity;
        self.max_capacity = max_capacity;
        self
    }

    /// Set the initial station count
    pub fn with_stations(mut self, num_stations: usize) -> Self {
        self.num_stations = num_stations;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn economics(&self) -> SiteEconomics {
        SiteEconomics {
            fixed_cost: self.fixed_cost,
            variable_cost: self.variable_cost,
            unit_revenue: self.unit_revenue,
            arrival_rate: self.arrival_rate,
            mean_service_time: self.mean_service_time,
        }
    }

    /// Display label: the name if set, otherwise the id.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Site {}", self.id.value()))
    }

    /// Reject negative or non-finite economics, inverted bounds and bad coordinates.
    pub fn validate(&self) -> EvNetResult<()> {
        let fields = [
            ("fixed_cost", self.fixed_cost),
            ("variable_cost", self.variable_cost),
            ("unit_revenue", self.unit_revenue),
            ("arrival_rate", self.arrival_rate),
            ("mean_service_time", self.mean_service_time),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EvNetError::Validation(format!(
                    "{}: {} must be finite and non-negative, got {}",
                    self.label(),
                    field,
                    value
                )));
            }
        }
        if self.min_capacity > self.max_capacity {
            return Err(EvNetError::Validation(format!(
                "{}: min_capacity {} exceeds max_capacity {}",
                self.label(),
                self.min_capacity,
                self.max_capacity
            )));
        }
        self.location
            .validate()
            .map_err(|e| EvNetError::Validation(format!("{}: {}", self.label(), e)))
    }

    /// Offered load `effective_arrival_rate * mean_service_time` (Erlangs).
    pub fn offered_load(&self) -> f64 {
        self.effective_arrival_rate * self.mean_service_time
    }

    /// Mean number of busy stations under the Erlang loss model.
    ///
    /// ```text
    /// E[busy] = Σ_{k=1..c} a^k/(k-1)!  /  Σ_{k=0..c} a^k/k!  =  a · (1 - B(c))
    /// ```
    ///
    /// with `a` the offered load, `c = num_stations` and `B` the Erlang-B
    /// blocking probability. `B` follows `B(k) = a·B(k-1) / (k + a·B(k-1))`
    /// from `B(0) = 1`, which stays in [0, 1] for any load. Zero stations
    /// gives 0.
    pub fn expected_utilization(&self) -> f64 {
        let load = self.offered_load();
        let mut blocking = 1.0;
        for k in 1..=self.num_stations {
            let carried = load * blocking;
            blocking = carried / (k as f64 + carried);
        }
        load * (1.0 - blocking)
    }

    /// Utilization as a percentage of installed stations.
    ///
    /// Returns `None` when the site has no stations.
    pub fn expected_percentage_utilization(&self) -> Option<f64> {
        if self.num_stations == 0 {
            return None;
        }
        Some(self.expected_utilization() / self.num_stations as f64 * 100.0)
    }

    /// `unit_revenue * E[busy] - (variable_cost * stations - fixed_cost)`
    pub fn profit(&self) -> f64 {
        let revenue = self.unit_revenue * self.expected_utilization();
        let cost = self.variable_cost * self.num_stations as f64 - self.fixed_cost;
        revenue - cost
    }
}
