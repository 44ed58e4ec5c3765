//! `evnet completions`: shell completion scripts

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};
use evnet_cli::cli::build_cli_command;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

const BIN_NAME: &str = "evnet";

pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let mut sink: Box<dyn Write> = match out {
        Some(path) => Box::new(create_script(path)?),
        None => Box::new(io::stdout().lock()),
    };
    generate(shell, &mut build_cli_command(), BIN_NAME, &mut sink);
    sink.flush().context("writing completion script")?;

    if let Some(path) = out {
        println!("Wrote {shell} completion to {}", path.display());
    }
    Ok(())
}

fn create_script(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory '{}'", parent.display()))?;
    }
    File::create(path).with_context(|| format!("creating completion file '{}'", path.display()))
}
