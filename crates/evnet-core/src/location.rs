//! Geographic points.

use crate::error::{EvNetError, EvNetResult};
use crate::units::Kilometers;
use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

/// A latitude/longitude point in degrees.
///
/// Coordinates are not checked on construction; call [`GeoLocation::validate`]
/// (which [`crate::Network::new`] does for every site) before relying on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check both coordinates against their valid ranges.
    pub fn validate(&self) -> EvNetResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(EvNetError::Validation(format!(
                "latitude {} is outside the valid range of [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(EvNetError::Validation(format!(
                "longitude {} is outside the valid range of [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Great-circle (haversine) distance to `other`.
    ///
    /// ```
    /// use evnet_core::GeoLocation;
    ///
    /// let a = GeoLocation::new(0.0, 0.0);
    /// let b = GeoLocation::new(0.0, 1.0);
    ///
    /// // 1 degree of longitude at the equator is about 111 km
    /// let d = a.distance(&b).value();
    /// assert!(d > 110.0 && d < 112.0);
    /// ```
    pub fn distance(&self, other: &GeoLocation) -> Kilometers {
        if self == other {
            return Kilometers::ZERO;
        }
        let meters = self.as_point().haversine_distance(&other.as_point());
        Kilometers(meters / 1000.0)
    }

    /// The point in `geo`'s (x = longitude, y = latitude) convention.
    pub fn as_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<Point<f64>> for GeoLocation {
    fn from(point: Point<f64>) -> Self {
        GeoLocation::new(point.y(), point.x())
    }
}

impl std::fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ranges() {
        assert!(GeoLocation::new(45.0, -120.0).validate().is_ok());
        assert!(GeoLocation::new(-90.0, 180.0).validate().is_ok());
        assert!(GeoLocation::new(90.5, 0.0).validate().is_err());
        assert!(GeoLocation::new(0.0, -180.5).validate().is_err());
    }

    #[test]
    fn test_longitude_checked_independently() {
        // latitude is fine, longitude alone is out of range
        let err = GeoLocation::new(10.0, 200.0).validate().unwrap_err();
        assert!(err.to_string().contains("longitude"));
    }

    #[test]
    fn test_distance_symmetric_and_zero_on_self() {
        let philadelphia = GeoLocation::new(39.9526, -75.1652);
        let new_york = GeoLocation::new(40.7128, -74.0060);

        let d1 = philadelphia.distance(&new_york);
        let d2 = new_york.distance(&philadelphia);
        assert!((d1.value() - d2.value()).abs() < 1e-9);
        assert!(d1.value() > 120.0 && d1.value() < 140.0);
        assert_eq!(philadelphia.distance(&philadelphia), Kilometers::ZERO);
    }

    #[test]
    fn test_point_round_trip_axes() {
        let loc = GeoLocation::new(12.5, -3.25);
        let point = loc.as_point();
        assert_eq!(point.x(), -3.25);
        assert_eq!(point.y(), 12.5);
        assert_eq!(GeoLocation::from(point), loc);
    }
}
