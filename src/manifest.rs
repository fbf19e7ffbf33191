use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::{
    config::{Linkage, Metric, PsaConfig},
    simulation::SimulationSet,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub label: String,
    pub name: String,
    pub run: u32,
    pub topology: PathBuf,
    pub trajectory: PathBuf,
}

/// Everything the trajectory comparator needs to reproduce an analysis.
/// Entry order is the row/column order of its distance matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub metric: Metric,
    pub linkage: Linkage,
    pub plot: String,
    pub path_select: String,
    /// Reference structure, already joined onto the analysis root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_select: Option<String>,
    #[serde(default)]
    pub align: bool,
    #[serde(default)]
    pub store: bool,
    pub simulations: Vec<ManifestEntry>,
}

impl RunManifest {
    pub fn new(config: &PsaConfig, set: &SimulationSet) -> Self {
        let simulations = set
            .iter()
            .enumerate()
            .map(|(index, s)| ManifestEntry {
                index,
                label: s.label.clone(),
                name: s.identity.name().to_string(),
                run: s.identity.run(),
                topology: s.files.topology.clone(),
                trajectory: s.files.trajectory.clone(),
            })
            .collect();
        Self {
            metric: config.metric,
            linkage: config.linkage,
            plot: config.plot.clone(),
            path_select: config.path_select.clone(),
            reference: config.reference.as_ref().map(|r| set.root().join(r)),
            ref_select: config.ref_select.clone(),
            align: config.align,
            store: config.store,
            simulations,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        info!("Writing run manifest {}", path.to_string_lossy());
        let f = fs::File::create(path)
            .with_context(|| format!("Creating {}", path.to_string_lossy()))?;
        let mut w = io::BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self)?;
        w.flush()?;
        Ok(())
    }
}
