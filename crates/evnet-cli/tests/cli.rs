//! Integration tests for the `evnet` binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Three sites ~3 km apart on the equator, one reference covering the
/// first two.
const INSTANCE_YAML: &str = r#"
name: line
budget: 5
gamma: 0.5
sites:
  - { id: 0, name: north, latitude: 0.0, longitude: 0.0, fixed_cost: 1.0, variable_cost: 0.5, unit_revenue: 2.0, arrival_rate: 5.0, mean_service_time: 1.0, max_capacity: 3 }
  - { id: 1, latitude: 0.0, longitude: 0.027, fixed_cost: 1.0, variable_cost: 0.5, unit_revenue: 2.0, arrival_rate: 5.0, mean_service_time: 1.0, max_capacity: 3 }
  - { id: 2, latitude: 0.0, longitude: 0.054, fixed_cost: 1.0, variable_cost: 0.5, unit_revenue: 2.0, arrival_rate: 5.0, mean_service_time: 1.0, max_capacity: 3 }
reference_locations:
  - { latitude: 0.0, longitude: 0.0135, radius_km: 2.0, min_supply: 4 }
planner:
  local_search_iterations: 10
  seed: 1
"#;

fn write_instance(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("line.yaml");
    fs::write(&path, INSTANCE_YAML).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("solve"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_solve_writes_summary() {
    let dir = tempdir().unwrap();
    let instance = write_instance(dir.path());
    let out = dir.path().join("plans/line.json");

    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["solve", "--instance"])
        .arg(&instance)
        .arg("--out")
        .arg(&out)
        .args(["--iterations", "15", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Capacity Plan Summary"))
        .stdout(predicate::str::contains("Status: Feasible"))
        .stdout(predicate::str::contains("north"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["feasible"], true);
    assert_eq!(json["budget"], 5);
    assert!(json["total_stations"].as_u64().unwrap() <= 5);
    assert_eq!(json["local_search_history"].as_array().unwrap().len(), 15);
    let sites = json["sites"].as_array().unwrap();
    let covered = sites[0]["stations"].as_u64().unwrap() + sites[1]["stations"].as_u64().unwrap();
    assert!(covered >= 4);
}

#[test]
fn test_solve_rejects_unknown_solver() {
    let dir = tempdir().unwrap();
    let instance = write_instance(dir.path());

    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["solve", "--instance"])
        .arg(&instance)
        .args(["--solver", "gurobi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mip solver"));
}

#[test]
fn test_solve_time_limit_needs_highs() {
    let dir = tempdir().unwrap();
    let instance = write_instance(dir.path());

    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["solve", "--instance"])
        .arg(&instance)
        .args(["--time-limit", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("time_limit_secs"))
        .stderr(predicate::str::contains("solver-highs"));
}

#[test]
fn test_solve_missing_instance_fails() {
    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["solve", "--instance", "/nonexistent/instance.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading problem instance"));
}

#[test]
fn test_validate_clean_instance() {
    let dir = tempdir().unwrap();
    let instance = write_instance(dir.path());

    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["validate", "--instance"])
        .arg(&instance)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 sites"))
        .stdout(predicate::str::contains("Instance is valid"));
}

#[test]
fn test_validate_reports_infeasible_coverage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, INSTANCE_YAML.replace("min_supply: 4", "min_supply: 7")).unwrap();

    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["validate", "--instance"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("coverage"))
        .stderr(predicate::str::contains("instance is invalid"));
}

#[test]
fn test_generate_then_validate() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("generator.yaml");
    fs::write(
        &config,
        r#"
region: [[4.85, 52.33], [5.0, 52.33], [5.0, 52.43], [4.85, 52.43]]
num_sites: 10
neighborhood_radius_km: 4.0
mean_min_capacity: 0.0
planner:
  local_search_iterations: 5
"#,
    )
    .unwrap();
    let out = dir.path().join("generated.json");

    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["generate", "--config"])
        .arg(&config)
        .arg("--out")
        .arg(&out)
        .args(["--seed", "11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sites: 10"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["sites"].as_array().unwrap().len(), 10);
    assert!(json["budget"].as_u64().unwrap() > 0);

    // loadable by the other commands
    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["validate", "--instance"])
        .arg(&out)
        .assert()
        .stdout(predicate::str::contains("10 sites"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("evnet"));
}

#[test]
fn test_completions_to_file() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("completions/evnet.zsh");

    let mut cmd = cargo_bin_cmd!("evnet");
    cmd.args(["completions", "zsh", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote zsh completion"));
    assert!(fs::read_to_string(&out).unwrap().contains("evnet"));
}
