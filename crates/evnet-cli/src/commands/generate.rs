//! `evnet generate`: synthetic instance from a generator config

use anyhow::{Context, Result};
use evnet_scenarios::{load_generator_config, save_instance, NetworkGenerator};
use std::path::Path;

pub fn handle(config_path: &Path, out: &Path, seed: Option<u64>) -> Result<()> {
    let config = load_generator_config(config_path)?;
    let generator = NetworkGenerator::new(config).context("invalid generator config")?;
    let instance = generator.generate(seed).context("generating network")?;
    save_instance(&instance, out)?;

    println!("Generated instance:");
    println!("  Sites: {}", instance.sites.len());
    println!("  Reference locations: {}", instance.reference_locations.len());
    println!(
        "  Capacity: {} total, {} required supply",
        instance.total_max_capacity(),
        instance.total_min_supply()
    );
    println!("  Budget: {}", instance.budget);
    println!("\nWritten to {}", out.display());
    Ok(())
}
