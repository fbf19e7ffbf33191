use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;
use psa_util_rust::{condensed_len, PsaConfig, SimulationIdentity, SimulationSet};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Analysis config (TOML), the standard AdK method set if omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distance vector index of the comparison between two simulations
    Pair(PairCMD),

    /// Every comparison with its distance vector index
    List,
}

#[derive(Args)]
struct PairCMD {
    /// Simulation, ex. "DIMS 1" or "DIMS(1)"
    sim_a: SimulationIdentity,

    /// Simulation, ex. "rTMD-F 3"
    sim_b: SimulationIdentity,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = PsaConfig::load(cli.config.as_deref())?;
    let set = SimulationSet::from_config(&config, Path::new("."))?;
    let indexer = set.indexer();
    info!(
        "Catalog of {} simulations, {} comparisons",
        indexer.len(),
        condensed_len(indexer.len())
    );

    match &cli.command {
        Commands::Pair(args) => {
            let id = indexer.pair_index(&args.sim_a, &args.sim_b)?;
            println!("comparison {id}, {} to {}", args.sim_a, args.sim_b);
        }
        Commands::List => {
            println!("# id sim_a sim_b");
            for (id, a, b) in indexer.pairs() {
                println!("{id} {} {}", set.label(a)?, set.label(b)?);
            }
        }
    };
    Ok(())
}
