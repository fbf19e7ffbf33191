use anyhow::{anyhow, Result};
use clap::Parser;
use colorgrad::preset::viridis;
use log::info;
use nalgebra::DMatrix;
use plotters::{
    chart::ChartBuilder,
    prelude::{BitMapBackend, IntoDrawingArea},
    style::WHITE,
};
use psa_util_rust::{DistanceVector, PsaConfig, SimulationSet};
use std::path::{Path, PathBuf};

mod heatmap;
use heatmap::{heatmap, Colorbar};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Distance file written by the comparator, condensed or square
    distances: PathBuf,

    /// Analysis config (TOML), the standard AdK method set if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output image
    #[arg(short, long, default_value = "psa_heatmap.png")]
    output: PathBuf,

    /// Height of the heat map in pixels
    #[arg(short, long, default_value_t = 900)]
    size: u32,
}

fn plot_distances(
    output: &Path,
    values: &DMatrix<f64>,
    labels: &[&str],
    plot_height: u32,
    (min, max): (f64, f64),
) -> Result<()> {
    let plot_color_width: u32 = 90;
    let plot_width = plot_height + plot_color_width;

    let drawing_area = BitMapBackend::new(output, (plot_width, plot_height)).into_drawing_area();
    drawing_area.fill(&WHITE)?;

    let pixel_width = drawing_area.dim_in_pixel().0;
    let (left, right) = drawing_area.split_horizontally(pixel_width - plot_color_width);
    let colorbar = Colorbar::new(min, max, viridis());
    colorbar.draw(ChartBuilder::on(&right))?;

    let mut chart_builder = ChartBuilder::on(&left);
    chart_builder.margin(10);
    heatmap(values, labels, &colorbar, chart_builder)?;
    drawing_area.present()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = PsaConfig::load(cli.config.as_deref())?;
    let set = SimulationSet::from_config(&config, Path::new("."))?;
    let distances = DistanceVector::read(&cli.distances, set.len())?;
    let range = distances
        .min_max()
        .ok_or(anyhow!("At least two simulations are needed for a heat map"))?;

    info!("Plotting distance heat map {}", cli.output.to_string_lossy());
    plot_distances(
        &cli.output,
        &distances.to_matrix(),
        &set.labels(),
        cli.size,
        range,
    )?;
    Ok(())
}
