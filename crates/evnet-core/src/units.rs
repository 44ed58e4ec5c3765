//! Unit newtypes for planning quantities.
//!
//! Distances come back from the great-circle collaborator in kilometres and
//! neighborhood radii are specified in kilometres; keeping them in a
//! dedicated type stops a radius in degrees from sneaking into a coverage
//! test.
//!
//! ```
//! use evnet_core::units::Kilometers;
//!
//! let radius = Kilometers(2.5);
//! assert!(Kilometers(1.0) < radius);
//! assert_eq!((radius * 2.0).value(), 5.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Distance in kilometres (km)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kilometers(pub f64);

impl Kilometers {
    /// Zero distance
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw numeric value
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Squared magnitude, for `exp(-gamma * d^2)` kernels over typed distances
    #[inline]
    pub fn squared(self) -> f64 {
        self.0 * self.0
    }
}

impl Add for Kilometers {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Kilometers {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Kilometers {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Kilometers {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Div<Kilometers> for Kilometers {
    type Output = f64;
    fn div(self, rhs: Kilometers) -> Self::Output {
        self.0 / rhs.0
    }
}

impl std::fmt::Display for Kilometers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} km", self.0)
    }
}
