//! Error type shared by the model, the planner and the scenario tooling.
//!
//! Library code returns [`EvNetResult`]. The binary wraps failures in
//! `anyhow` so file paths and command context end up in the message.
//!
//! ```
//! use evnet_core::{EvNetError, EvNetResult, GeoLocation};
//!
//! fn checked(lat: f64, lon: f64) -> EvNetResult<GeoLocation> {
//!     let location = GeoLocation::new(lat, lon);
//!     location.validate()?;
//!     Ok(location)
//! }
//!
//! assert!(matches!(checked(95.0, 0.0), Err(EvNetError::Validation(_))));
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvNetError {
    /// Bad coordinates, costs, rates or capacity bounds
    #[error("invalid input: {0}")]
    Validation(String),

    /// No allocation satisfies budget, bounds and coverage together
    #[error("infeasible: {0}")]
    Infeasible(String),

    /// MILP backend failure other than proven infeasibility
    #[error("solver failed: {0}")]
    Solver(String),

    #[error("bad planner configuration: {0}")]
    Config(String),
}

impl EvNetError {
    /// True when retrying with the same inputs cannot succeed.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, EvNetError::Infeasible(_))
    }
}

pub type EvNetResult<T> = Result<T, EvNetError>;
