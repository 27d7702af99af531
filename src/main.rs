//! pkbind CLI

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pkbind::report::{ImageFormat, Reporter};
use pkbind::SimulationConfig;

#[derive(Parser)]
#[command(name = "pkbind")]
#[command(about = "Simulate drug absorption, tissue distribution and target binding")]
#[command(version)]
struct Cli {
    /// Simulation configuration (JSON). Defaults to the reference scenario.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the plots; overrides `report.output_dir`
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Image format for the plots (png or svg); overrides `report.format`
    #[arg(long)]
    format: Option<ImageFormat>,

    /// Fail when the bound fraction leaves [0, 1]
    #[arg(long)]
    strict: bool,

    /// Show a progress bar while integrating
    #[arg(long)]
    progress: bool,

    /// Integrate and log diagnostics without writing plots
    #[arg(long)]
    no_plots: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(dir) = cli.output_dir {
        config.report.output_dir = dir;
    }
    if let Some(format) = cli.format {
        config.report.format = format;
    }
    config.numerics.strict |= cli.strict;
    config.solver.progress = cli.progress;

    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let simulation = config.validate().context("invalid configuration")?;
    let output = simulation.run().context("simulation failed")?;

    if let Some(last) = output.trajectory.last() {
        tracing::info!(
            iblood = last.iblood,
            itissue = last.itissue,
            f = last.f,
            "final state"
        );
    }

    if cli.no_plots {
        return Ok(());
    }
    let written = Reporter::new(config.report.clone())
        .render(&output)
        .context("writing plots")?;
    tracing::info!("wrote {} plots to {}", written.len(), config.report.output_dir.display());
    Ok(())
}
