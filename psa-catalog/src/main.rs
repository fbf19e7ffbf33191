use anyhow::{anyhow, Result};
use clap::Parser;
use log::info;
use psa_util_rust::{condensed_len, Linkage, Metric, PsaConfig, RunManifest, SimulationSet};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Analysis config (TOML), the standard AdK method set if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that contains the methods directory
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Fail if any topology or trajectory file is missing
    #[arg(long)]
    check: bool,

    /// Number of threads to check files with
    #[arg(short, long, default_value_t = 2)]
    threads: usize,

    /// Write a JSON run manifest for the trajectory comparator
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Path metric, overrides the config
    #[arg(long, value_enum)]
    metric: Option<Metric>,

    /// Clustering linkage, overrides the config
    #[arg(long, value_enum)]
    linkage: Option<Linkage>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut config = PsaConfig::load(cli.config.as_deref())?;
    if let Some(metric) = cli.metric {
        config.metric = metric;
    }
    if let Some(linkage) = cli.linkage {
        config.linkage = linkage;
    }
    let set = SimulationSet::from_config(&config, &cli.root)?;
    info!(
        "{} simulations, {} comparisons",
        set.len(),
        condensed_len(set.len())
    );

    println!("# index label topology trajectory");
    for (i, sim) in set.iter().enumerate() {
        println!(
            "{i} {} {} {}",
            sim.label,
            sim.files.topology.to_string_lossy(),
            sim.files.trajectory.to_string_lossy()
        );
    }

    if cli.check {
        let missing = set.missing_files(cli.threads)?;
        if !missing.is_empty() {
            return Err(anyhow!("{} files are missing", missing.len()));
        }
        info!("All {} simulations are present", set.len());
    }

    if let Some(manifest_path) = cli.manifest {
        RunManifest::new(&config, &set).save(&manifest_path)?;
    }
    Ok(())
}
