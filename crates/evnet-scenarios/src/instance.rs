//! Problem instance files.
//!
//! An instance is everything the planner needs: sites, reference locations,
//! budget, spillover decay and optional planner settings. Files are JSON or
//! YAML, picked by extension.

use anyhow::{Context, Result};
use evnet_algo::planner::{adjusted_capacity_caps, CapacityPlanner, PlannerConfig};
use evnet_core::{
    Diagnostics, EvNetResult, GeoLocation, IssueCategory, Kilometers, Network, ReferenceLocation,
    Site, SiteEconomics,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

fn default_gamma() -> f64 {
    1.0
}

/// A candidate site as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub fixed_cost: f64,
    pub variable_cost: f64,
    pub unit_revenue: f64,
    pub arrival_rate: f64,
    pub mean_service_time: f64,
    #[serde(default)]
    pub min_capacity: usize,
    pub max_capacity: usize,
}

impl SiteRecord {
    pub fn to_site(&self) -> Site {
        let economics = SiteEconomics {
            fixed_cost: self.fixed_cost,
            variable_cost: self.variable_cost,
            unit_revenue: self.unit_revenue,
            arrival_rate: self.arrival_rate,
            mean_service_time: self.mean_service_time,
        };
        let site = Site::new(
            self.id,
            GeoLocation::new(self.latitude, self.longitude),
            economics,
        )
        .with_capacity(self.min_capacity, self.max_capacity);
        match &self.name {
            Some(name) => site.with_name(name.clone()),
            None => site,
        }
    }
}

impl From<&Site> for SiteRecord {
    fn from(site: &Site) -> Self {
        let economics = site.economics();
        Self {
            id: site.id.value(),
            name: site.name.clone(),
            latitude: site.location.latitude,
            longitude: site.location.longitude,
            fixed_cost: economics.fixed_cost,
            variable_cost: economics.variable_cost,
            unit_revenue: economics.unit_revenue,
            arrival_rate: economics.arrival_rate,
            mean_service_time: economics.mean_service_time,
            min_capacity: site.min_capacity,
            max_capacity: site.max_capacity,
        }
    }
}

/// A coverage requirement as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub min_supply: usize,
}

impl ReferenceRecord {
    pub fn to_reference(&self) -> ReferenceLocation {
        ReferenceLocation::new(
            GeoLocation::new(self.latitude, self.longitude),
            Kilometers(self.radius_km),
            self.min_supply,
        )
    }
}

/// A complete planning problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub budget: usize,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    pub sites: Vec<SiteRecord>,
    #[serde(default)]
    pub reference_locations: Vec<ReferenceRecord>,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl ProblemInstance {
    pub fn network(&self) -> EvNetResult<Network> {
        Network::new(self.sites.iter().map(SiteRecord::to_site).collect(), self.gamma)
    }

    /// Reference locations, not yet resolved against any network
    pub fn reference_locations(&self) -> Vec<ReferenceLocation> {
        self.reference_locations
            .iter()
            .map(ReferenceRecord::to_reference)
            .collect()
    }

    /// Planner using the instance's own settings
    pub fn into_planner(self) -> EvNetResult<CapacityPlanner> {
        let config = self.planner.clone();
        self.into_planner_with(config)
    }

    pub fn into_planner_with(self, config: PlannerConfig) -> EvNetResult<CapacityPlanner> {
        let network = self.network()?;
        CapacityPlanner::new(network, self.reference_locations(), self.budget, config)
    }

    pub fn total_max_capacity(&self) -> usize {
        self.sites.iter().map(|s| s.max_capacity).sum()
    }

    pub fn total_min_supply(&self) -> usize {
        self.reference_locations.iter().map(|r| r.min_supply).sum()
    }
}

/// Load an instance from JSON or YAML.
pub fn load_instance(path: &Path) -> Result<ProblemInstance> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading problem instance '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&data).context("parsing problem instance yaml")
        }
        Some("json") => serde_json::from_str(&data).context("parsing problem instance json"),
        _ => serde_json::from_str(&data)
            .or_else(|_| serde_yaml::from_str(&data))
            .context("parsing problem instance"),
    }
}

/// Write an instance as YAML for `.yaml`/`.yml`, pretty JSON otherwise.
pub fn save_instance(instance: &ProblemInstance, path: &Path) -> Result<()> {
    let data = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::to_string(instance).context("serializing problem instance yaml")?
        }
        _ => serde_json::to_string_pretty(instance)
            .context("serializing problem instance json")?,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory '{}'", parent.display()))?;
        }
    }
    fs::write(path, data).with_context(|| format!("writing problem instance '{}'", path.display()))
}

/// Everything wrong with an instance, without building a planner.
///
/// Errors mean the planner will refuse the instance or the relaxation
/// cannot succeed; warnings flag entities that can never contribute.
pub fn validate_instance(instance: &ProblemInstance) -> Diagnostics {
    let mut diag = Diagnostics::new();

    if let Err(e) = instance.planner.validate() {
        diag.error(IssueCategory::Config, e.to_string());
    }

    let mut ids = HashSet::new();
    let mut sites_ok = true;
    for record in &instance.sites {
        let site = record.to_site();
        if !ids.insert(record.id) {
            diag.error_at(IssueCategory::Site, site.label(), "duplicate site id");
            sites_ok = false;
        }
        if let Err(e) = site.validate() {
            diag.error_at(IssueCategory::Site, site.label(), e.to_string());
            sites_ok = false;
        }
        if record.max_capacity == 0 {
            diag.warning_at(
                IssueCategory::Site,
                site.label(),
                "max_capacity is 0; site can never open",
            );
        }
    }
    if instance.sites.is_empty() {
        diag.warning(IssueCategory::Site, "instance has no sites");
    }

    let required: usize = instance.sites.iter().map(|s| s.min_capacity).sum();
    if required > instance.budget {
        diag.error(
            IssueCategory::Budget,
            format!(
                "minimum capacities need {required} stations, budget is {}",
                instance.budget
            ),
        );
    }

    if !instance.gamma.is_finite() || instance.gamma < 0.0 {
        diag.error(
            IssueCategory::Network,
            format!("gamma must be finite and non-negative, got {}", instance.gamma),
        );
        sites_ok = false;
    }

    let network = if sites_ok { instance.network().ok() } else { None };

    for (idx, mut reference) in instance.reference_locations().into_iter().enumerate() {
        let entity = format!("Reference {idx}");
        if let Err(e) = reference.validate() {
            diag.error_at(IssueCategory::Reference, &entity, e.to_string());
            continue;
        }
        if reference.min_supply > instance.budget {
            diag.error_at(
                IssueCategory::Coverage,
                &entity,
                format!(
                    "needs {} stations, budget is {}",
                    reference.min_supply, instance.budget
                ),
            );
        }
        let Some(network) = &network else {
            continue;
        };
        reference.update_neighborhood_sites(network.sites());
        let reachable = reference.max_reachable_supply(network.sites());
        if reference.min_supply > reachable {
            diag.error_at(
                IssueCategory::Coverage,
                &entity,
                format!(
                    "needs {} stations, {} sites within {} hold at most {reachable}",
                    reference.min_supply,
                    reference.neighborhood_sites().len(),
                    reference.neighborhood_radius
                ),
            );
        } else if reference.neighborhood_sites().is_empty() {
            diag.warning_at(IssueCategory::Coverage, &entity, "no sites within radius");
        }
    }

    if let (Some(network), Ok(())) = (&network, instance.planner.validate()) {
        let caps = adjusted_capacity_caps(network, instance.planner.epsilon);
        for (site, cap) in network.sites().iter().zip(caps) {
            if cap < site.min_capacity {
                diag.error_at(
                    IssueCategory::Relaxation,
                    site.label(),
                    format!(
                        "spatial cap {cap} is below min_capacity {}; relaxation is infeasible",
                        site.min_capacity
                    ),
                );
            }
        }
    }

    diag
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn site(id: usize, lon: f64) -> SiteRecord {
        SiteRecord {
            id,
            name: None,
            latitude: 0.0,
            longitude: lon,
            fixed_cost: 1.0,
            variable_cost: 0.5,
            unit_revenue: 2.0,
            arrival_rate: 5.0,
            mean_service_time: 1.0,
            min_capacity: 0,
            max_capacity: 3,
        }
    }

    fn instance() -> ProblemInstance {
        ProblemInstance {
            name: Some("line".to_string()),
            budget: 5,
            gamma: 0.5,
            sites: vec![site(0, 0.0), site(1, 0.027), site(2, 0.054)],
            reference_locations: vec![ReferenceRecord {
                latitude: 0.0,
                longitude: 0.0135,
                radius_km: 2.0,
                min_supply: 4,
            }],
            planner: PlannerConfig::default().with_seed(1).with_iterations(5),
        }
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = r#"
budget: 4
sites:
  - id: 0
    latitude: 52.0
    longitude: 4.0
    fixed_cost: 1.0
    variable_cost: 0.5
    unit_revenue: 2.0
    arrival_rate: 5.0
    mean_service_time: 1.0
    max_capacity: 4
"#;
        let parsed: ProblemInstance = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.gamma, 1.0);
        assert_eq!(parsed.sites[0].min_capacity, 0);
        assert!(parsed.reference_locations.is_empty());
        assert_eq!(parsed.planner, PlannerConfig::default());
    }

    #[test]
    fn test_site_record_from_site() {
        let mut record = site(4, 0.5);
        record.name = Some("Harbour".to_string());
        record.min_capacity = 1;
        assert_eq!(SiteRecord::from(&record.to_site()), record);
    }

    #[test]
    fn test_save_and_load_by_extension() {
        let dir = tempdir().unwrap();
        let original = instance();
        for file in ["instance.json", "instance.yaml", "nested/instance.yml"] {
            let path = dir.path().join(file);
            save_instance(&original, &path).unwrap();
            assert_eq!(load_instance(&path).unwrap(), original, "{file}");
        }
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("instance.txt");
        fs::write(&path, serde_yaml::to_string(&instance()).unwrap()).unwrap();
        assert_eq!(load_instance(&path).unwrap(), instance());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_instance(Path::new("/nonexistent/instance.json")).unwrap_err();
        assert!(err.to_string().contains("reading problem instance"));
    }

    #[test]
    fn test_into_planner_resolves_neighborhoods() {
        let planner = instance().into_planner().unwrap();
        assert_eq!(planner.budget(), 5);
        assert_eq!(planner.reference_locations()[0].neighborhood_sites(), &[0, 1]);
        assert_eq!(planner.config().local_search_iterations, 5);
    }

    #[test]
    fn test_validate_clean_instance() {
        let diag = validate_instance(&instance());
        assert!(!diag.has_errors(), "{diag}");
    }

    #[test]
    fn test_validate_reports_everything() {
        let mut bad = instance();
        bad.sites[0].min_capacity = 3;
        bad.sites[1].min_capacity = 3;
        bad.sites[2].arrival_rate = -1.0;
        bad.reference_locations[0].min_supply = 9;
        bad.reference_locations.push(ReferenceRecord {
            latitude: 0.0,
            longitude: 0.0,
            radius_km: 0.0,
            min_supply: 1,
        });
        let diag = validate_instance(&bad);

        assert_eq!(diag.in_category(IssueCategory::Site).count(), 1);
        assert_eq!(diag.in_category(IssueCategory::Budget).count(), 1);
        assert_eq!(diag.in_category(IssueCategory::Reference).count(), 1);
        // over budget; neighborhood check skipped without a valid network
        assert_eq!(diag.in_category(IssueCategory::Coverage).count(), 1);
    }

    #[test]
    fn test_validate_unreachable_coverage_and_tight_caps() {
        let mut bad = instance();
        bad.budget = 20;
        bad.reference_locations[0].min_supply = 7;
        let diag = validate_instance(&bad);
        assert_eq!(diag.in_category(IssueCategory::Coverage).count(), 1);

        let mut crowded = instance();
        for (i, s) in crowded.sites.iter_mut().enumerate() {
            s.longitude = i as f64 * 0.0027;
            s.min_capacity = 1;
        }
        crowded.reference_locations.clear();
        let diag = validate_instance(&crowded);
        assert_eq!(diag.in_category(IssueCategory::Relaxation).count(), 3);
    }

    #[test]
    fn test_validate_warnings() {
        let mut odd = instance();
        odd.sites[2].max_capacity = 0;
        odd.reference_locations.push(ReferenceRecord {
            latitude: 10.0,
            longitude: 10.0,
            radius_km: 1.0,
            min_supply: 0,
        });
        let diag = validate_instance(&odd);
        assert!(!diag.has_errors(), "{diag}");
        assert_eq!(diag.warning_count(), 2);
    }
}
