//! Polygonal planning regions.

use evnet_core::{EvNetError, EvNetResult, GeoLocation};
use geo::{BoundingRect, Contains, LineString, Polygon};
use rand::Rng;

const DEGREES_LAT_PER_KM: f64 = 1.0 / 110.54;
const DEGREES_LON_PER_KM_AT_EQUATOR: f64 = 1.0 / 111.32;

/// Rejection-sampling attempts allowed per requested location
const MAX_ATTEMPTS_PER_LOCATION: usize = 10_000;

/// Axis-aligned bounds in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// A polygon in (longitude, latitude) coordinates.
#[derive(Debug, Clone)]
pub struct Region {
    polygon: Polygon<f64>,
    bounds: Bounds,
}

impl Region {
    pub fn new(polygon: Polygon<f64>) -> EvNetResult<Self> {
        let rect = polygon
            .bounding_rect()
            .ok_or_else(|| EvNetError::Validation("region polygon is empty".to_string()))?;
        let bounds = Bounds {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        };
        let corners = [
            GeoLocation::new(bounds.min_lat, bounds.min_lon),
            GeoLocation::new(bounds.max_lat, bounds.max_lon),
        ];
        for corner in &corners {
            corner
                .validate()
                .map_err(|e| EvNetError::Validation(format!("region out of range: {e}")))?;
        }
        Ok(Self { polygon, bounds })
    }

    /// Build from an exterior ring of `[longitude, latitude]` pairs.
    pub fn from_exterior(ring: &[[f64; 2]]) -> EvNetResult<Self> {
        if ring.len() < 3 {
            return Err(EvNetError::Validation(format!(
                "region needs at least 3 vertices, got {}",
                ring.len()
            )));
        }
        if ring.iter().flatten().any(|c| !c.is_finite()) {
            return Err(EvNetError::Validation(
                "region vertices must be finite".to_string(),
            ));
        }
        let exterior = LineString::from(ring.to_vec());
        Self::new(Polygon::new(exterior, Vec::new()))
    }

    pub fn rectangle(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> EvNetResult<Self> {
        Self::from_exterior(&[
            [min_lon, min_lat],
            [max_lon, min_lat],
            [max_lon, max_lat],
            [min_lon, max_lat],
        ])
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Strict interior test; boundary points are outside.
    pub fn contains(&self, location: &GeoLocation) -> bool {
        self.polygon.contains(&location.as_point())
    }

    /// `count` locations drawn uniformly inside the region.
    ///
    /// Fails when the region is too thin for rejection sampling to land
    /// inside it.
    pub fn random_locations<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> EvNetResult<Vec<GeoLocation>> {
        let b = self.bounds;
        let budget = count.saturating_mul(MAX_ATTEMPTS_PER_LOCATION);
        let mut locations = Vec::with_capacity(count);
        let mut attempts = 0;
        while locations.len() < count {
            if attempts >= budget {
                return Err(EvNetError::Validation(format!(
                    "placed {} of {count} locations after {attempts} attempts; region too thin",
                    locations.len()
                )));
            }
            attempts += 1;
            let lat = b.min_lat + rng.gen::<f64>() * (b.max_lat - b.min_lat);
            let lon = b.min_lon + rng.gen::<f64>() * (b.max_lon - b.min_lon);
            let candidate = GeoLocation::new(lat, lon);
            if self.contains(&candidate) {
                locations.push(candidate);
            }
        }
        Ok(locations)
    }

    /// Grid points inside the region spaced roughly `radius_km` apart.
    ///
    /// Rows step by a fixed latitude increment; within a row the longitude
    /// step widens with `1 / cos(latitude)` to keep the ground spacing.
    pub fn uniform_grid(&self, radius_km: f64) -> EvNetResult<Vec<GeoLocation>> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(EvNetError::Validation(format!(
                "grid spacing must be positive, got {radius_km}"
            )));
        }
        let b = self.bounds;
        let lat_step = radius_km * DEGREES_LAT_PER_KM;
        let mut locations = Vec::new();
        let mut lat = b.min_lat;
        while lat < b.max_lat {
            let lon_step = radius_km * DEGREES_LON_PER_KM_AT_EQUATOR / lat.to_radians().cos();
            let mut lon = b.min_lon;
            while lon < b.max_lon {
                let point = GeoLocation::new(lat, lon);
                if self.contains(&point) {
                    locations.push(point);
                }
                lon += lon_step;
            }
            lat += lat_step;
        }
        Ok(locations)
    }
}
