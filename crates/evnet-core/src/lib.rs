//! # evnet-core: EV Charging Network Model
//!
//! Data structures for planning the capacity of a network of electric-vehicle
//! charging sites.
//!
//! ## Model
//!
//! - [`GeoLocation`]: latitude/longitude point with great-circle distance
//! - [`Site`]: a candidate charging site with economics, capacity bounds and
//!   an Erlang-loss utilization model
//! - [`ReferenceLocation`]: a coverage requirement (radius + minimum supply)
//! - [`Network`]: the site set, its distance matrix and the spillover coupling
//!   that turns each site's nominal arrival rate into an effective one
//! - [`Allocation`]: station count per site, the planner's decision vector
//!
//! ## Spillover
//!
//! A site's effective demand depends on how many stations its neighbours
//! have relative to its own count:
//!
//! ```text
//! λ_eff(i) = λ(i) / Σ_j exp(-γ d_ij²) · n_j / n_i
//! ```
//!
//! Every allocation change goes through [`Network::apply_allocation`], which
//! refreshes the effective rates before profit or utilization can be read.
//!
//! ## Quick Start
//!
//! ```
//! use evnet_core::*;
//!
//! let economics = SiteEconomics {
//!     fixed_cost: 1.0,
//!     variable_cost: 0.5,
//!     unit_revenue: 2.0,
//!     arrival_rate: 5.0,
//!     mean_service_time: 1.0,
//! };
//! let sites = vec![
//!     Site::new(0, GeoLocation::new(52.37, 4.89), economics).with_capacity(0, 4),
//!     Site::new(1, GeoLocation::new(52.38, 4.90), economics).with_capacity(1, 4),
//! ];
//! let mut network = Network::new(sites, 1.0)?;
//! network.apply_allocation(&Allocation::new(vec![2, 1]))?;
//!
//! assert_eq!(network.total_charging_stations(), 3);
//! println!("profit: {:.2}", network.total_profit());
//! # Ok::<(), EvNetError>(())
//! ```

pub mod allocation;
pub mod coverage;
pub mod diagnostics;
pub mod error;
pub mod location;
pub mod network;
pub mod site;
pub mod units;

pub use allocation::Allocation;
pub use coverage::ReferenceLocation;
pub use diagnostics::{DiagnosticIssue, Diagnostics, IssueCategory, Severity};
pub use error::{EvNetError, EvNetResult};
pub use location::GeoLocation;
pub use network::Network;
pub use site::{Site, SiteEconomics, SiteId};
pub use units::Kilometers;
