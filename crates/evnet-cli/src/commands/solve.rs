//! `evnet solve`: relaxation plus local search on an instance file

use anyhow::{Context, Result};
use evnet_algo::planner::{MipSolverKind, PlanSummary};
use evnet_scenarios::load_instance;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::info;

/// Flags of the `solve` subcommand
#[derive(Debug)]
pub struct SolveArgs<'a> {
    pub instance: &'a Path,
    pub out: Option<&'a Path>,
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
    pub solver: Option<&'a str>,
    pub mip_gap: Option<f64>,
    pub time_limit: Option<f64>,
    pub verbose: bool,
}

pub fn handle(args: &SolveArgs) -> Result<()> {
    let instance = load_instance(args.instance)?;
    info!(
        sites = instance.sites.len(),
        references = instance.reference_locations.len(),
        budget = instance.budget,
        "instance loaded"
    );

    let mut config = instance.planner.clone();
    if let Some(iterations) = args.iterations {
        config.local_search_iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(label) = args.solver {
        config.solver = label.parse::<MipSolverKind>()?;
    }
    if args.mip_gap.is_some() {
        config.mip_gap = args.mip_gap;
    }
    if args.time_limit.is_some() {
        config.time_limit_secs = args.time_limit;
    }
    config.verbose |= args.verbose;

    let mut planner = instance
        .into_planner_with(config)
        .context("preparing capacity planner")?;
    planner.solve().context("solving capacity plan")?;
    let summary = planner.summary();

    if let Some(out) = args.out {
        write_summary(&summary, out)?;
    }

    print!("{}", summary.summary());
    println!();
    print_site_table(&summary)?;
    if let Some(out) = args.out {
        println!("\nResults written to {}", out.display());
    }
    Ok(())
}

fn write_summary(summary: &PlanSummary, out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory '{}'", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(summary).context("serializing plan summary")?;
    let mut file = File::create(out)
        .with_context(|| format!("creating output file '{}'", out.display()))?;
    file.write_all(json.as_bytes()).context("writing plan summary")?;
    Ok(())
}

fn print_site_table(summary: &PlanSummary) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "SITE\tSTATIONS\tBOUNDS\tRATE\tEFF RATE\tUTIL %\tPROFIT")?;
    for site in &summary.sites {
        let label = site
            .name
            .clone()
            .unwrap_or_else(|| format!("Site {}", site.id));
        let util = site
            .percentage_utilization
            .map(|p| format!("{p:.1}"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            writer,
            "{}\t{}\t{}..{}\t{:.3}\t{:.3}\t{}\t{:.4}",
            label,
            site.stations,
            site.min_capacity,
            site.max_capacity,
            site.arrival_rate,
            site.effective_arrival_rate,
            util,
            site.profit
        )?;
    }
    writer.flush()?;
    Ok(())
}
