//! `evnet validate`: diagnostics for an instance file

use anyhow::{bail, Result};
use evnet_scenarios::{load_instance, validate_instance};
use std::path::Path;

pub fn handle(instance_path: &Path) -> Result<()> {
    let instance = load_instance(instance_path)?;
    let diagnostics = validate_instance(&instance);

    println!("Instance {}", instance_path.display());
    println!("  {} sites", instance.sites.len());
    println!("  {} reference locations", instance.reference_locations.len());
    println!("  budget {}", instance.budget);

    for issue in &diagnostics.issues {
        println!("  {issue}");
    }

    if diagnostics.has_errors() {
        bail!("instance is invalid: {}", diagnostics.summary());
    }
    println!("Instance is valid ({})", diagnostics.summary());
    Ok(())
}
