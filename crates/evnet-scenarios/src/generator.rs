//! Synthetic network generator.
//!
//! Places sites at random inside a region, draws spatially correlated site
//! economics, lays reference locations on a grid and sizes the budget between
//! the coverage minimum and the total capacity.

use crate::instance::{ProblemInstance, ReferenceRecord, SiteRecord};
use crate::region::Region;
use anyhow::{Context, Result};
use evnet_algo::planner::PlannerConfig;
use evnet_core::{EvNetError, EvNetResult, GeoLocation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson, StandardNormal};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

fn default_gamma() -> f64 {
    1.0
}

fn default_fixed_cost_mean() -> f64 {
    1.0
}

fn default_fixed_cost_std() -> f64 {
    0.2
}

fn default_variable_cost() -> f64 {
    0.5
}

fn default_unit_revenue() -> f64 {
    2.0
}

fn default_arrival_rate_mean() -> f64 {
    5.0
}

fn default_arrival_rate_std() -> f64 {
    1.0
}

fn default_mean_service_time_mean() -> f64 {
    1.0
}

fn default_mean_service_time_std() -> f64 {
    0.5
}

fn default_mean_max_capacity() -> f64 {
    10.0
}

fn default_mean_min_capacity() -> f64 {
    0.5
}

fn default_mean_min_supply() -> f64 {
    1.0
}

fn default_budget_weight() -> f64 {
    0.5
}

/// Generator parameters (YAML or JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Exterior ring of `[longitude, latitude]` pairs
    pub region: Vec<[f64; 2]>,
    pub num_sites: usize,
    /// Coverage radius of every reference location, also the grid spacing
    pub neighborhood_radius_km: f64,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    #[serde(default = "default_fixed_cost_mean")]
    pub fixed_cost_mean: f64,
    #[serde(default = "default_fixed_cost_std")]
    pub fixed_cost_std: f64,
    #[serde(default = "default_variable_cost")]
    pub variable_cost: f64,
    #[serde(default = "default_unit_revenue")]
    pub unit_revenue: f64,
    #[serde(default = "default_arrival_rate_mean")]
    pub arrival_rate_mean: f64,
    #[serde(default = "default_arrival_rate_std")]
    pub arrival_rate_std: f64,
    #[serde(default = "default_mean_service_time_mean")]
    pub mean_service_time_mean: f64,
    #[serde(default = "default_mean_service_time_std")]
    pub mean_service_time_std: f64,
    #[serde(default = "default_mean_max_capacity")]
    pub mean_max_capacity: f64,
    #[serde(default = "default_mean_min_capacity")]
    pub mean_min_capacity: f64,
    #[serde(default = "default_mean_min_supply")]
    pub mean_min_supply: f64,
    /// Budget position between total min supply (0) and total max capacity (1)
    #[serde(default = "default_budget_weight")]
    pub budget_weight: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Copied into the generated instance
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl GeneratorConfig {
    /// Config with defaults for everything but the region and sizes
    pub fn new(region: Vec<[f64; 2]>, num_sites: usize, neighborhood_radius_km: f64) -> Self {
        Self {
            region,
            num_sites,
            neighborhood_radius_km,
            gamma: default_gamma(),
            fixed_cost_mean: default_fixed_cost_mean(),
            fixed_cost_std: default_fixed_cost_std(),
            variable_cost: default_variable_cost(),
            unit_revenue: default_unit_revenue(),
            arrival_rate_mean: default_arrival_rate_mean(),
            arrival_rate_std: default_arrival_rate_std(),
            mean_service_time_mean: default_mean_service_time_mean(),
            mean_service_time_std: default_mean_service_time_std(),
            mean_max_capacity: default_mean_max_capacity(),
            mean_min_capacity: default_mean_min_capacity(),
            mean_min_supply: default_mean_min_supply(),
            budget_weight: default_budget_weight(),
            seed: None,
            planner: PlannerConfig::default(),
        }
    }

    pub fn validate(&self) -> EvNetResult<()> {
        if !self.neighborhood_radius_km.is_finite() || self.neighborhood_radius_km <= 0.0 {
            return Err(EvNetError::Config(format!(
                "neighborhood_radius_km must be positive, got {}",
                self.neighborhood_radius_km
            )));
        }
        if !(0.0..=1.0).contains(&self.budget_weight) {
            return Err(EvNetError::Config(format!(
                "budget_weight must lie in [0, 1], got {}",
                self.budget_weight
            )));
        }
        let non_negative = [
            ("gamma", self.gamma),
            ("fixed_cost_mean", self.fixed_cost_mean),
            ("fixed_cost_std", self.fixed_cost_std),
            ("variable_cost", self.variable_cost),
            ("unit_revenue", self.unit_revenue),
            ("arrival_rate_mean", self.arrival_rate_mean),
            ("arrival_rate_std", self.arrival_rate_std),
            ("mean_service_time_mean", self.mean_service_time_mean),
            ("mean_service_time_std", self.mean_service_time_std),
            ("mean_max_capacity", self.mean_max_capacity),
            ("mean_min_capacity", self.mean_min_capacity),
            ("mean_min_supply", self.mean_min_supply),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EvNetError::Config(format!(
                    "{field} must be finite and non-negative, got {value}"
                )));
            }
        }
        self.planner.validate()
    }
}

/// Load a generator config from YAML or JSON.
pub fn load_generator_config(path: &Path) -> Result<GeneratorConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading generator config '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&data).context("parsing generator config json"),
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&data).context("parsing generator config yaml")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing generator config"),
    }
}

/// Draws random problem instances from a [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct NetworkGenerator {
    config: GeneratorConfig,
    region: Region,
}

impl NetworkGenerator {
    pub fn new(config: GeneratorConfig) -> EvNetResult<Self> {
        config.validate()?;
        let region = Region::from_exterior(&config.region)?;
        Ok(Self { config, region })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Generate one instance. `seed` overrides the config's seed.
    pub fn generate(&self, seed: Option<u64>) -> EvNetResult<ProblemInstance> {
        let mut rng = seed
            .or(self.config.seed)
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);

        let sites = self.generate_sites(&mut rng)?;
        let reference_locations = self.generate_reference_locations(&mut rng)?;

        let max_total: usize = sites.iter().map(|s| s.max_capacity).sum();
        let min_total: usize = reference_locations.iter().map(|r| r.min_supply).sum();
        if max_total <= min_total {
            return Err(EvNetError::Infeasible(format!(
                "generated capacity {max_total} does not exceed required supply {min_total}; \
                 try another seed or fewer reference locations"
            )));
        }
        let w = self.config.budget_weight;
        let budget = (w * max_total as f64 + (1.0 - w) * min_total as f64).floor() as usize;

        info!(
            sites = sites.len(),
            references = reference_locations.len(),
            max_total,
            min_total,
            budget,
            "generated network"
        );

        Ok(ProblemInstance {
            name: None,
            budget,
            gamma: self.config.gamma,
            sites,
            reference_locations,
            planner: self.config.planner.clone(),
        })
    }

    fn generate_sites(&self, rng: &mut StdRng) -> EvNetResult<Vec<SiteRecord>> {
        let c = &self.config;
        let locations = self.region.random_locations(c.num_sites, rng)?;
        let kernel = correlation_matrix(&locations, c.gamma);

        let arrival_rate =
            correlated_field(&kernel, c.arrival_rate_mean, c.arrival_rate_std, rng);
        let service_time =
            correlated_field(&kernel, c.mean_service_time_mean, c.mean_service_time_std, rng);
        let fixed_cost = correlated_field(&kernel, c.fixed_cost_mean, c.fixed_cost_std, rng);

        let sites = locations
            .iter()
            .enumerate()
            .map(|(i, location)| {
                let max_capacity = poisson(c.mean_max_capacity - 1.0, rng) + 1;
                let min_capacity = poisson(c.mean_min_capacity, rng).min(max_capacity);
                SiteRecord {
                    id: i,
                    name: None,
                    latitude: location.latitude,
                    longitude: location.longitude,
                    fixed_cost: fixed_cost[i],
                    variable_cost: c.variable_cost,
                    unit_revenue: c.unit_revenue,
                    arrival_rate: arrival_rate[i],
                    mean_service_time: service_time[i],
                    min_capacity,
                    max_capacity,
                }
            })
            .collect();
        Ok(sites)
    }

    fn generate_reference_locations(&self, rng: &mut StdRng) -> EvNetResult<Vec<ReferenceRecord>> {
        let radius = self.config.neighborhood_radius_km;
        let grid = self.region.uniform_grid(radius)?;
        Ok(grid
            .into_iter()
            .map(|location| ReferenceRecord {
                latitude: location.latitude,
                longitude: location.longitude,
                radius_km: radius,
                min_supply: poisson(self.config.mean_min_supply - 1.0, rng) + 1,
            })
            .collect())
    }
}

/// `K[i][j] = exp(-gamma · d_ij²)`
pub fn correlation_matrix(locations: &[GeoLocation], gamma: f64) -> Vec<Vec<f64>> {
    locations
        .iter()
        .map(|a| {
            locations
                .iter()
                .map(|b| (-gamma * a.distance(b).squared()).exp())
                .collect()
        })
        .collect()
}

/// `max(0, mean + std · (K z)_i / ‖K_i‖)` with `z` i.i.d. standard normal.
///
/// Row normalisation gives every entry unit variance before scaling, while
/// nearby sites share most of their noise.
fn correlated_field<R: Rng + ?Sized>(
    kernel: &[Vec<f64>],
    mean: f64,
    std: f64,
    rng: &mut R,
) -> Vec<f64> {
    let z: Vec<f64> = (0..kernel.len()).map(|_| StandardNormal.sample(rng)).collect();
    kernel
        .iter()
        .map(|row| {
            let norm = row.iter().map(|k| k * k).sum::<f64>().sqrt();
            let mixed: f64 = row.iter().zip(&z).map(|(k, z)| k * z).sum();
            let noise = if norm > 0.0 { mixed / norm } else { 0.0 };
            (mean + std * noise).max(0.0)
        })
        .collect()
}

/// Poisson draw; a non-positive mean yields 0
fn poisson<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> usize {
    match Poisson::new(mean) {
        Ok(dist) if mean > 0.0 => dist.sample(rng) as usize,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [0.1, 0.0], [0.1, 0.1], [0.0, 0.1]]
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig::new(square(), 12, 3.0)
    }

    #[test]
    fn test_defaults_from_yaml() {
        let yaml = r#"
region: [[0.0, 0.0], [0.1, 0.0], [0.1, 0.1], [0.0, 0.1]]
num_sites: 12
neighborhood_radius_km: 3.0
"#;
        let parsed: GeneratorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed, config());
        assert_eq!(parsed.mean_max_capacity, 10.0);
        assert_eq!(parsed.budget_weight, 0.5);
    }

    #[test]
    fn test_load_config_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.json");
        fs::write(&path, serde_json::to_string(&config()).unwrap()).unwrap();
        assert_eq!(load_generator_config(&path).unwrap(), config());

        let missing = load_generator_config(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(missing.to_string().contains("reading generator config"));
    }

    #[test]
    fn test_generated_instance_shape() {
        let generator = NetworkGenerator::new(config()).unwrap();
        let instance = generator.generate(Some(17)).unwrap();

        assert_eq!(instance.sites.len(), 12);
        for (i, site) in instance.sites.iter().enumerate() {
            assert_eq!(site.id, i);
            assert!(site.max_capacity >= 1);
            assert!(site.min_capacity <= site.max_capacity);
            assert!(site.arrival_rate >= 0.0);
            assert!(site.mean_service_time >= 0.0);
            assert!(site.fixed_cost >= 0.0);
            let location = GeoLocation::new(site.latitude, site.longitude);
            assert!(generator.region().contains(&location));
        }

        assert!(!instance.reference_locations.is_empty());
        for reference in &instance.reference_locations {
            assert_eq!(reference.radius_km, 3.0);
            // mean_min_supply 1.0 means Poisson(0) + 1
            assert_eq!(reference.min_supply, 1);
        }

        let max_total = instance.total_max_capacity();
        let min_total = instance.total_min_supply();
        assert!(max_total > min_total);
        let expected = ((max_total + min_total) as f64 * 0.5).floor() as usize;
        assert_eq!(instance.budget, expected);
    }

    #[test]
    fn test_seed_reproducible() {
        let generator = NetworkGenerator::new(config()).unwrap();
        assert_eq!(
            generator.generate(Some(5)).unwrap(),
            generator.generate(Some(5)).unwrap()
        );

        let mut seeded = config();
        seeded.seed = Some(5);
        let from_config = NetworkGenerator::new(seeded).unwrap().generate(None).unwrap();
        assert_eq!(from_config, generator.generate(Some(5)).unwrap());
    }

    #[test]
    fn test_infeasible_when_capacity_too_small() {
        // one site of capacity 1 against a grid of single-station demands
        let mut tight = config();
        tight.num_sites = 1;
        tight.mean_max_capacity = 1.0;
        tight.neighborhood_radius_km = 1.0;
        let err = NetworkGenerator::new(tight)
            .unwrap()
            .generate(Some(1))
            .unwrap_err();
        assert!(matches!(err, EvNetError::Infeasible(_)));
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut bad = config();
        bad.budget_weight = 1.5;
        assert!(NetworkGenerator::new(bad).is_err());

        let mut bad = config();
        bad.neighborhood_radius_km = 0.0;
        assert!(NetworkGenerator::new(bad).is_err());

        let mut bad = config();
        bad.region.truncate(2);
        assert!(NetworkGenerator::new(bad).is_err());
    }

    #[test]
    fn test_correlated_field_properties() {
        let locations = vec![
            GeoLocation::new(0.0, 0.0),
            GeoLocation::new(0.0, 0.0001),
            GeoLocation::new(0.0, 5.0),
        ];
        let kernel = correlation_matrix(&locations, 1.0);
        assert_eq!(kernel[0][0], 1.0);
        assert!(kernel[0][1] > 0.99);
        assert_eq!(kernel[0][2], 0.0);

        let mut rng = StdRng::seed_from_u64(3);
        let field = correlated_field(&kernel, 5.0, 1.0, &mut rng);
        // co-located sites share their noise
        assert!((field[0] - field[1]).abs() < 1e-3);

        let flat = correlated_field(&kernel, 2.0, 0.0, &mut rng);
        assert_eq!(flat, vec![2.0, 2.0, 2.0]);
        let clamped = correlated_field(&kernel, -1.0, 0.0, &mut rng);
        assert_eq!(clamped, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_poisson_non_positive_mean() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(poisson(0.0, &mut rng), 0);
        assert_eq!(poisson(-2.0, &mut rng), 0);
        let draws: usize = (0..200).map(|_| poisson(4.0, &mut rng)).sum();
        assert!(draws > 400 && draws < 1200);
    }
}
