use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;
use psa_util_rust::{DistanceVector, PsaConfig, SimulationIdentity, SimulationSet};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Distance file written by the comparator, condensed or square
    distances: PathBuf,

    /// Analysis config (TOML), the standard AdK method set if omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distance between two simulations
    Get(GetCMD),

    /// Simulations ranked by their distance to one simulation
    Nearest(NearestCMD),

    /// Rewrite the distances as a condensed vector
    Condense(CondenseCMD),
}

#[derive(Args)]
struct GetCMD {
    sim_a: SimulationIdentity,
    sim_b: SimulationIdentity,
}

#[derive(Args)]
struct NearestCMD {
    sim: SimulationIdentity,

    /// Number of neighbors to print, all if omitted
    #[arg(short, long)]
    k: Option<usize>,
}

#[derive(Args)]
struct CondenseCMD {
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = PsaConfig::load(cli.config.as_deref())?;
    let set = SimulationSet::from_config(&config, Path::new("."))?;
    let indexer = set.indexer();
    let distances = DistanceVector::read(&cli.distances, indexer.len())?;

    match &cli.command {
        Commands::Get(args) => {
            let d = distances.distance(indexer, &args.sim_a, &args.sim_b)?;
            println!("{d}");
        }
        Commands::Nearest(args) => {
            let neighbors = distances.nearest(indexer, &args.sim)?;
            let k = args.k.unwrap_or(neighbors.len());
            println!("# {} label distance", set.label(&args.sim)?);
            for (sim, d) in neighbors.into_iter().take(k) {
                println!("{} {d}", set.label(sim)?);
            }
        }
        Commands::Condense(args) => {
            info!("Writing {} values", distances.len());
            distances.save(&args.output)?;
        }
    };
    Ok(())
}
